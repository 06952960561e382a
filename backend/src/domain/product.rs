//! Catalogue products listed by artisans.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Money, ProductId, UserId};

/// Largest stock count a listing may hold.
pub const MAX_STOCK: u32 = i32::MAX.unsigned_abs();

/// Default processing time advertised for new listings.
pub const DEFAULT_PROCESSING_TIME: &str = "1-3 business days";
/// Default listing currency.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Validation errors raised while creating or editing products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    /// Title was blank once trimmed.
    EmptyTitle,
    /// Description is required for every status except draft.
    MissingDescription,
    /// Artisans may only pick this status through moderation.
    StatusNotSelectable { status: ProductStatus },
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::MissingDescription => {
                write!(f, "description is required unless the product is a draft")
            }
            Self::StatusNotSelectable { status } => {
                write!(f, "status {status} is reserved for moderation")
            }
        }
    }
}

impl std::error::Error for ProductValidationError {}

/// Product categories offered by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Pottery,
    Textiles,
    Jewelry,
    Woodwork,
    Metalcraft,
    Paintings,
    Sculptures,
    #[serde(rename = "Home Decor")]
    HomeDecor,
    Handicrafts,
    #[serde(rename = "Traditional Art")]
    TraditionalArt,
    #[serde(rename = "Modern Art")]
    ModernArt,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Self; 11] = [
        Self::Pottery,
        Self::Textiles,
        Self::Jewelry,
        Self::Woodwork,
        Self::Metalcraft,
        Self::Paintings,
        Self::Sculptures,
        Self::HomeDecor,
        Self::Handicrafts,
        Self::TraditionalArt,
        Self::ModernArt,
    ];

    /// Display and wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pottery => "Pottery",
            Self::Textiles => "Textiles",
            Self::Jewelry => "Jewelry",
            Self::Woodwork => "Woodwork",
            Self::Metalcraft => "Metalcraft",
            Self::Paintings => "Paintings",
            Self::Sculptures => "Sculptures",
            Self::HomeDecor => "Home Decor",
            Self::Handicrafts => "Handicrafts",
            Self::TraditionalArt => "Traditional Art",
            Self::ModernArt => "Modern Art",
        }
    }

    /// Parse a wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == raw)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    Draft,
    Published,
    Pending,
    Approved,
    Rejected,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    /// Every status.
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::Published,
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::OutOfStock,
        Self::Discontinued,
    ];

    /// Statuses shown in the public catalogue.
    pub const PUBLIC: [Self; 2] = [Self::Published, Self::Approved];

    /// Stable wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::OutOfStock => "out-of-stock",
            Self::Discontinued => "discontinued",
        }
    }

    /// Parse the wire representation.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }

    /// Whether anonymous visitors may see the listing.
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Published | Self::Approved)
    }

    /// Whether an artisan may set this status on their own listing.
    pub const fn is_artisan_selectable(self) -> bool {
        matches!(
            self,
            Self::Draft | Self::Published | Self::OutOfStock | Self::Discontinued
        )
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options a customer may pick from on customizable products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationOptions {
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub materials: Vec<String>,
    pub personalizations: Vec<String>,
}

/// Shipping terms advertised on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingTerms {
    pub free_shipping: bool,
    pub shipping_cost: Money,
    pub processing_time: String,
}

impl Default for ShippingTerms {
    fn default() -> Self {
        Self {
            free_shipping: false,
            shipping_cost: Money::ZERO,
            processing_time: DEFAULT_PROCESSING_TIME.to_owned(),
        }
    }
}

impl ShippingTerms {
    /// Cost charged for shipping one order line of this product.
    pub fn charge(&self) -> Money {
        if self.free_shipping {
            Money::ZERO
        } else {
            self.shipping_cost
        }
    }
}

/// Engagement counters for a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductStats {
    pub views: u64,
    pub likes: u64,
    pub sales: u64,
    pub rating: f64,
    pub review_count: u64,
}

/// A catalogue listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub artisan: UserId,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub subcategory: Option<String>,
    pub materials: Option<String>,
    pub size: Option<String>,
    pub price: Money,
    pub original_price: Option<Money>,
    pub currency: String,
    pub stock: u32,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub customizable: bool,
    pub customization_options: CustomizationOptions,
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
    pub featured: bool,
    pub stats: ProductStats,
    pub slug: String,
    pub shipping: ShippingTerms,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub subcategory: Option<String>,
    pub materials: Option<String>,
    pub size: Option<String>,
    pub price: Money,
    pub original_price: Option<Money>,
    pub stock: u32,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub customizable: bool,
    pub customization_options: CustomizationOptions,
    pub status: ProductStatus,
    pub shipping: ShippingTerms,
}

/// Partial update of a listing; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub materials: Option<String>,
    pub size: Option<String>,
    pub price: Option<Money>,
    pub original_price: Option<Money>,
    pub stock: Option<u32>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub customizable: Option<bool>,
    pub customization_options: Option<CustomizationOptions>,
    pub status: Option<ProductStatus>,
    pub shipping: Option<ShippingTerms>,
}

fn normalise_title(title: &str) -> Result<String, ProductValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ProductValidationError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

fn normalise_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

impl Product {
    /// Create a listing owned by `artisan`.
    ///
    /// # Errors
    /// Rejects blank titles, missing descriptions on non-draft listings and
    /// statuses reserved for moderation.
    pub fn create(
        id: ProductId,
        artisan: UserId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ProductValidationError> {
        if !draft.status.is_artisan_selectable() {
            return Err(ProductValidationError::StatusNotSelectable {
                status: draft.status,
            });
        }
        let title = normalise_title(&draft.title)?;
        let product = Self {
            id,
            artisan,
            slug: slugify(&title),
            title,
            description: normalise_text(draft.description),
            category: draft.category,
            subcategory: normalise_text(draft.subcategory),
            materials: normalise_text(draft.materials),
            size: normalise_text(draft.size),
            price: draft.price,
            original_price: draft.original_price,
            currency: DEFAULT_CURRENCY.to_owned(),
            stock: draft.stock,
            images: draft.images,
            tags: normalise_tags(draft.tags),
            customizable: draft.customizable,
            customization_options: draft.customization_options,
            status: draft.status,
            rejection_reason: None,
            featured: false,
            stats: ProductStats::default(),
            shipping: draft.shipping,
            created_at: now,
            updated_at: now,
        };
        product.check_description()?;
        Ok(product)
    }

    /// Apply an owner's edit.
    ///
    /// The listing is left untouched when validation fails.
    pub fn apply_patch(
        &mut self,
        patch: ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ProductValidationError> {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            if !status.is_artisan_selectable() {
                return Err(ProductValidationError::StatusNotSelectable { status });
            }
            next.status = status;
        }
        if let Some(title) = patch.title {
            next.title = normalise_title(&title)?;
            next.slug = slugify(&next.title);
        }
        if let Some(description) = patch.description {
            next.description = normalise_text(Some(description));
        }
        if let Some(category) = patch.category {
            next.category = category;
        }
        if let Some(subcategory) = patch.subcategory {
            next.subcategory = normalise_text(Some(subcategory));
        }
        if let Some(materials) = patch.materials {
            next.materials = normalise_text(Some(materials));
        }
        if let Some(size) = patch.size {
            next.size = normalise_text(Some(size));
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if let Some(original_price) = patch.original_price {
            next.original_price = Some(original_price);
        }
        if let Some(stock) = patch.stock {
            next.stock = stock;
        }
        if let Some(images) = patch.images {
            next.images = images;
        }
        if let Some(tags) = patch.tags {
            next.tags = normalise_tags(tags);
        }
        if let Some(customizable) = patch.customizable {
            next.customizable = customizable;
        }
        if let Some(options) = patch.customization_options {
            next.customization_options = options;
        }
        if let Some(shipping) = patch.shipping {
            next.shipping = shipping;
        }
        next.check_description()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Flip between draft and published.
    ///
    /// Any other status becomes published, matching how owners re-list a
    /// moderated or paused product.
    pub fn toggle_publication(&mut self, now: DateTime<Utc>) -> Result<(), ProductValidationError> {
        let next = if self.status == ProductStatus::Published {
            ProductStatus::Draft
        } else {
            ProductStatus::Published
        };
        if next != ProductStatus::Draft && self.description.is_none() {
            return Err(ProductValidationError::MissingDescription);
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Apply an admin moderation decision.
    pub fn moderate(&mut self, status: ProductStatus, rejection_reason: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        self.rejection_reason = if status == ProductStatus::Rejected {
            normalise_text(rejection_reason)
        } else {
            None
        };
        self.updated_at = now;
    }

    fn check_description(&self) -> Result<(), ProductValidationError> {
        if self.status != ProductStatus::Draft && self.description.is_none() {
            return Err(ProductValidationError::MissingDescription);
        }
        Ok(())
    }
}

/// Derive a URL slug from a title.
///
/// Lower-cases the title, drops everything except ASCII letters, digits,
/// spaces and hyphens, turns whitespace runs into `-` and collapses
/// repeated hyphens.
///
/// # Examples
/// ```
/// use karigari::domain::slugify;
///
/// assert_eq!(slugify("Blue Pottery Vase!"), "blue-pottery-vase");
/// assert_eq!(slugify("Hand -- woven   rug"), "hand-woven-rug");
/// ```
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == ' ' || *ch == '-')
        .collect();
    let mut slug = String::with_capacity(kept.len());
    for ch in kept.split_whitespace().collect::<Vec<_>>().join("-").chars() {
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }
    slug.trim_matches('-').to_owned()
}

#[cfg(test)]
mod tests;
