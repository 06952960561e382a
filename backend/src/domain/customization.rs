//! Bespoke-order negotiations between a customer and an artisan.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CustomizationId, DEFAULT_CURRENCY, Money, OrderId, ProductId, Timeline, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CustomizationStatus {
    Pending,
    UnderReview,
    Quoted,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl CustomizationStatus {
    pub const ALL: [Self; 8] = [
        Self::Pending,
        Self::UnderReview,
        Self::Quoted,
        Self::Accepted,
        Self::Rejected,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under-review",
            Self::Quoted => "quoted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

impl fmt::Display for CustomizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Validation errors for customization requests and quotes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomizationValidationError {
    #[error("request title must not be empty")]
    EmptyTitle,
    #[error("request description must not be empty")]
    EmptyDescription,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("budget minimum exceeds maximum")]
    InvertedBudget,
    #[error("quote total overflowed")]
    QuoteOverflow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: Option<String>,
}

/// Price range the customer is willing to pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Budget {
    pub min: Option<Money>,
    pub max: Option<Money>,
    pub currency: String,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub budget: Option<Budget>,
}

impl Default for Specifications {
    fn default() -> Self {
        Self {
            color: None,
            size: None,
            material: None,
            dimensions: None,
            quantity: default_quantity(),
            budget: None,
        }
    }
}

/// What the customer is asking for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub reference_images: Vec<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RequestDetails {
    /// Trim title and description and check quantity and budget.
    pub fn validated(mut self) -> Result<Self, CustomizationValidationError> {
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        if self.title.is_empty() {
            return Err(CustomizationValidationError::EmptyTitle);
        }
        if self.description.is_empty() {
            return Err(CustomizationValidationError::EmptyDescription);
        }
        if self.specifications.quantity == 0 {
            return Err(CustomizationValidationError::ZeroQuantity);
        }
        let inverted = self
            .specifications
            .budget
            .as_ref()
            .is_some_and(|budget| matches!((budget.min, budget.max), (Some(min), Some(max)) if min > max));
        if inverted {
            return Err(CustomizationValidationError::InvertedBudget);
        }
        Ok(self)
    }
}

/// Free-form reply from the artisan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtisanResponse {
    pub is_available: Option<bool>,
    pub estimated_price: Option<Money>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub alternative_options: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Cost components an artisan proposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteDraft {
    pub base_price: Money,
    pub customization_fee: Money,
    pub material_cost: Money,
    pub labor_cost: Money,
    pub currency: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub terms: Option<String>,
}

/// Priced offer whose total is the sum of its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub base_price: Money,
    pub customization_fee: Money,
    pub material_cost: Money,
    pub labor_cost: Money,
    pub total_price: Money,
    pub currency: String,
    pub valid_until: Option<DateTime<Utc>>,
    pub terms: Option<String>,
}

impl Quote {
    /// Sum the components into a quote.
    pub fn from_draft(draft: QuoteDraft) -> Result<Self, CustomizationValidationError> {
        let total_price = [draft.customization_fee, draft.material_cost, draft.labor_cost]
            .into_iter()
            .try_fold(draft.base_price, Money::checked_add)
            .ok_or(CustomizationValidationError::QuoteOverflow)?;
        Ok(Self {
            base_price: draft.base_price,
            customization_fee: draft.customization_fee,
            material_cost: draft.material_cost,
            labor_cost: draft.labor_cost,
            total_price,
            currency: draft
                .currency
                .filter(|currency| !currency.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            valid_until: draft.valid_until,
            terms: draft.terms,
        })
    }
}

/// Fields supplied by the customer when opening a request.
#[derive(Debug, Clone)]
pub struct NewCustomization {
    pub customer: UserId,
    pub artisan: UserId,
    pub product: ProductId,
    pub request_details: RequestDetails,
    pub priority: Priority,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub id: CustomizationId,
    pub customer: UserId,
    pub artisan: UserId,
    pub product: ProductId,
    pub request_details: RequestDetails,
    pub status: CustomizationStatus,
    pub artisan_response: Option<ArtisanResponse>,
    pub quote: Option<Quote>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub related_order: Option<OrderId>,
    #[schema(value_type = Vec<Object>)]
    pub timeline: Timeline<CustomizationStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customization {
    /// Open a pending request.
    pub fn open(
        id: CustomizationId,
        new: NewCustomization,
        now: DateTime<Utc>,
    ) -> Result<Self, CustomizationValidationError> {
        Ok(Self {
            id,
            customer: new.customer,
            artisan: new.artisan,
            product: new.product,
            request_details: new.request_details.validated()?,
            status: CustomizationStatus::Pending,
            artisan_response: None,
            quote: None,
            priority: new.priority,
            tags: new.tags,
            related_order: None,
            timeline: Timeline::starting_with(
                CustomizationStatus::Pending,
                now,
                Some("Customization request created".to_owned()),
                Some(new.customer),
            ),
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `user` is the requesting customer or the addressed artisan.
    pub fn is_participant(&self, user: UserId) -> bool {
        self.customer == user || self.artisan == user
    }

    /// Record a status change by `actor`.
    pub fn set_status(
        &mut self,
        actor: UserId,
        status: CustomizationStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) {
        let note = note
            .unwrap_or_else(|| format!("Customization request status updated to {status}"));
        self.status = status;
        self.timeline.push(status, now, Some(note), Some(actor));
        self.updated_at = now;
    }

    /// Attach the artisan's quote and mark the request quoted.
    pub fn submit_quote(
        &mut self,
        artisan: UserId,
        quote: Quote,
        message: Option<String>,
        now: DateTime<Utc>,
    ) {
        let response = self.artisan_response.get_or_insert_with(ArtisanResponse::default);
        response.is_available = Some(true);
        response.estimated_price = Some(quote.total_price);
        response.responded_at = Some(now);
        if message.is_some() {
            response.message = message;
        }
        let note = format!("Quote of {} {} sent", quote.total_price, quote.currency);
        self.quote = Some(quote);
        self.set_status(artisan, CustomizationStatus::Quoted, Some(note), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 15, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn money(minor: i64) -> Money {
        Money::from_minor(minor).expect("non-negative amount")
    }

    fn details() -> RequestDetails {
        RequestDetails {
            title: " Wedding shawl ".to_owned(),
            description: "Pashmina with initials".to_owned(),
            specifications: Specifications::default(),
            reference_images: Vec::new(),
            deadline: None,
            notes: None,
        }
    }

    fn request(now: DateTime<Utc>) -> Customization {
        Customization::open(
            CustomizationId::random(),
            NewCustomization {
                customer: UserId::random(),
                artisan: UserId::random(),
                product: ProductId::random(),
                request_details: details(),
                priority: Priority::default(),
                tags: Vec::new(),
            },
            now,
        )
        .expect("valid request")
    }

    #[rstest]
    fn opening_trims_and_starts_pending(now: DateTime<Utc>) {
        let request = request(now);
        assert_eq!(request.request_details.title, "Wedding shawl");
        assert_eq!(request.status, CustomizationStatus::Pending);
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.timeline.len(), 1);
    }

    #[rstest]
    fn inverted_budget_is_rejected() {
        let mut details = details();
        details.specifications.budget = Some(Budget {
            min: Some(money(500)),
            max: Some(money(100)),
            ..Budget::default()
        });
        assert_eq!(
            details.validated(),
            Err(CustomizationValidationError::InvertedBudget)
        );
    }

    #[rstest]
    fn quantity_defaults_to_one_when_omitted() {
        let json = serde_json::json!({ "title": "Mug", "description": "Blue glaze" });
        let details: RequestDetails = serde_json::from_value(json).expect("valid details");
        assert_eq!(details.specifications.quantity, 1);
    }

    #[rstest]
    fn status_change_appends_one_entry(now: DateTime<Utc>) {
        let mut request = request(now);
        let actor = request.artisan;
        request.set_status(actor, CustomizationStatus::UnderReview, None, now);
        assert_eq!(request.timeline.len(), 2);
        let entry = request.timeline.last().expect("entry");
        assert_eq!(entry.status, CustomizationStatus::UnderReview);
        assert_eq!(
            entry.note.as_deref(),
            Some("Customization request status updated to under-review")
        );
    }

    #[rstest]
    fn quote_total_is_component_sum(now: DateTime<Utc>) {
        let quote = Quote::from_draft(QuoteDraft {
            base_price: money(4_000),
            customization_fee: money(500),
            material_cost: money(1_200),
            labor_cost: money(800),
            ..QuoteDraft::default()
        })
        .expect("valid quote");
        assert_eq!(quote.total_price, money(6_500));
        assert_eq!(quote.currency, DEFAULT_CURRENCY);

        let mut request = request(now);
        let artisan = request.artisan;
        request.submit_quote(artisan, quote, Some("Ready in 3 weeks".to_owned()), now);
        assert_eq!(request.status, CustomizationStatus::Quoted);
        let response = request.artisan_response.expect("response recorded");
        assert_eq!(response.estimated_price, Some(money(6_500)));
        assert_eq!(response.message.as_deref(), Some("Ready in 3 weeks"));
    }

    #[rstest]
    fn statuses_round_trip_wire_names() {
        for status in CustomizationStatus::ALL {
            assert_eq!(CustomizationStatus::parse(status.as_str()), Some(status));
        }
    }
}
