//! Port for catalogue persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Category, Money, Product, ProductId, ProductStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
    }
}

/// Column a product listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSortField {
    #[default]
    CreatedAt,
    Price,
    Title,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Filters shared by the public catalogue, artisan and admin listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub artisan: Option<UserId>,
    /// Accepted statuses; empty means any.
    pub statuses: Vec<ProductStatus>,
    pub category: Option<Category>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// Case-insensitive match against title, description and tags.
    pub search: Option<String>,
    pub sort_by: ProductSortField,
    pub direction: SortDirection,
}

impl ProductQuery {
    /// Whether `product` passes every filter.
    ///
    /// Used by in-memory adapters; SQL adapters express the same filters in
    /// the query.
    pub fn matches(&self, product: &Product) -> bool {
        let artisan_ok = self.artisan.is_none_or(|artisan| product.artisan == artisan);
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&product.status);
        let category_ok = self.category.is_none_or(|category| product.category == category);
        let min_ok = self.min_price.is_none_or(|min| product.price >= min);
        let max_ok = self.max_price.is_none_or(|max| product.price <= max);
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            product.title.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
                || product.tags.iter().any(|tag| tag.contains(&needle))
        });
        artisan_ok && status_ok && category_ok && min_ok && max_ok && search_ok
    }
}

/// Inventory columns a listing update replaces. `None` keeps the stored
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryChange {
    pub stock: Option<u32>,
    pub images: Option<Vec<String>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Fetch several products; missing ids are skipped.
    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Increment the view counter and return the updated product.
    async fn record_view(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Persist the listing details of `product`.
    ///
    /// Stock, images and counters keep their stored values unless
    /// `inventory` replaces them, so units reserved by orders placed since
    /// `product` was loaded stay reserved. Returns the stored row, or `None`
    /// when it is gone.
    async fn update(
        &self,
        product: &Product,
        inventory: &InventoryChange,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Append image URIs after the stored ones and return the stored row.
    async fn append_images(
        &self,
        id: &ProductId,
        uris: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError>;

    async fn list(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError>;
}
