//! Orders: line items, pricing, fulfilment status and tracking.
//!
//! Artisans move an order along a fixed linear path. Admins may set any
//! status. Either way the change is recorded on the order's timeline.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Money, OrderId, ProductId, Timeline, UserId};

/// Prefix shared by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "KAR";

/// Human-facing order reference, `KAR` + `yy` + `MM` + four random digits.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use karigari::domain::OrderNumber;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
/// let number = OrderNumber::generate(at, &mut SmallRng::seed_from_u64(1));
/// assert!(number.as_str().starts_with("KAR2403"));
/// assert_eq!(number.as_str().len(), 11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "KAR24030042")]
pub struct OrderNumber(String);

/// Raised when a stored order number does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed order number: {0}")]
pub struct MalformedOrderNumber(pub String);

impl OrderNumber {
    /// Draw a fresh number for an order placed at `now`.
    pub fn generate(now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let suffix: u32 = rng.gen_range(0..10_000);
        Self(format!(
            "{ORDER_NUMBER_PREFIX}{:02}{:02}{suffix:04}",
            now.year().rem_euclid(100),
            now.month()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = MalformedOrderNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let well_formed = value
            .strip_prefix(ORDER_NUMBER_PREFIX)
            .is_some_and(|rest| rest.len() == 8 && rest.chars().all(|ch| ch.is_ascii_digit()));
        if well_formed {
            Ok(Self(value))
        } else {
            Err(MalformedOrderNumber(value))
        }
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fulfilment status of a whole order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }

    /// Statuses an artisan may move an order to from `self`.
    ///
    /// Terminal and admin-only statuses have no successors.
    pub const fn artisan_successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed],
            Self::Confirmed => &[Self::Processing],
            Self::Processing => &[Self::Shipped],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled | Self::Refunded => &[],
        }
    }

    /// Whether an artisan may move an order from `self` to `next`.
    pub fn artisan_may_move_to(self, next: Self) -> bool {
        self.artisan_successors().contains(&next)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-line fulfilment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

/// Payment methods accepted at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    Paypal,
    BankTransfer,
    CashOnDelivery,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// Validation errors raised while assembling an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("order must contain at least one item")]
    NoItems,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("shipping address {field} is required")]
    MissingAddressField { field: &'static str },
    #[error("carrier, tracking number and estimated delivery are required to ship")]
    IncompleteShipment,
}

/// Delivery address; every field but `phone` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Trim every line and reject blanks.
    pub fn validated(self) -> Result<Self, OrderValidationError> {
        fn required(value: String, field: &'static str) -> Result<String, OrderValidationError> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(OrderValidationError::MissingAddressField { field });
            }
            Ok(trimmed.to_owned())
        }
        Ok(Self {
            name: required(self.name, "name")?,
            street: required(self.street, "street")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            zip_code: required(self.zip_code, "zipCode")?,
            country: required(self.country, "country")?,
            phone: self
                .phone
                .map(|phone| phone.trim().to_owned())
                .filter(|phone| !phone.is_empty()),
        })
    }
}

/// Optional billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingAddress {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub same_as_shipping: bool,
}

impl Default for BillingAddress {
    fn default() -> Self {
        Self {
            name: None,
            street: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            phone: None,
            same_as_shipping: true,
        }
    }
}

/// Choices a customer made for one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemCustomizations {
    pub color: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub personalization: Option<String>,
    pub notes: Option<String>,
}

/// One purchased product.
///
/// `title` and `price` are snapshots taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductId,
    pub artisan: UserId,
    pub title: String,
    pub quantity: u32,
    pub price: Money,
    pub customizations: Option<ItemCustomizations>,
    pub status: ItemStatus,
}

impl OrderItem {
    /// Price times quantity, `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price.times(self.quantity)
    }
}

/// Errors from [`Pricing::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("pricing overflowed")]
    Overflow,
    #[error("discount exceeds the order amount")]
    DiscountTooLarge,
    #[error("total does not equal subtotal + shipping + tax - discount")]
    TotalMismatch,
}

/// Monetary breakdown of an order.
///
/// ## Invariants
/// - `total == subtotal + shipping + tax - discount`.
/// - every component is non-negative, so `discount` never exceeds the
///   gross amount.
///
/// The only constructors enforce both, including deserialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "PricingParts")]
pub struct Pricing {
    subtotal: Money,
    shipping: Money,
    tax: Money,
    discount: Money,
    total: Money,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingParts {
    subtotal: Money,
    #[serde(default)]
    shipping: Money,
    #[serde(default)]
    tax: Money,
    #[serde(default)]
    discount: Money,
    total: Money,
}

impl TryFrom<PricingParts> for Pricing {
    type Error = PricingError;

    fn try_from(parts: PricingParts) -> Result<Self, Self::Error> {
        let pricing = Self::new(parts.subtotal, parts.shipping, parts.tax, parts.discount)?;
        if pricing.total != parts.total {
            return Err(PricingError::TotalMismatch);
        }
        Ok(pricing)
    }
}

impl Pricing {
    /// Compute the total from its components.
    ///
    /// # Examples
    /// ```
    /// use karigari::domain::{Money, Pricing};
    ///
    /// let m = |v| Money::from_minor(v).unwrap();
    /// let pricing = Pricing::new(m(1_000), m(200), m(90), m(50)).unwrap();
    /// assert_eq!(pricing.total(), m(1_240));
    /// ```
    pub fn new(
        subtotal: Money,
        shipping: Money,
        tax: Money,
        discount: Money,
    ) -> Result<Self, PricingError> {
        let gross = subtotal
            .checked_add(shipping)
            .and_then(|sum| sum.checked_add(tax))
            .ok_or(PricingError::Overflow)?;
        let total = gross
            .checked_sub(discount)
            .ok_or(PricingError::DiscountTooLarge)?;
        Ok(Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        })
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn total(&self) -> Money {
        self.total
    }
}

/// Tracking details required before an order ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    carrier: String,
    tracking_number: String,
    estimated_delivery: DateTime<Utc>,
}

impl Shipment {
    /// Validate carrier and tracking number; both must be non-blank.
    pub fn try_new(
        carrier: &str,
        tracking_number: &str,
        estimated_delivery: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        let carrier = carrier.trim();
        let tracking_number = tracking_number.trim();
        if carrier.is_empty() || tracking_number.is_empty() {
            return Err(OrderValidationError::IncompleteShipment);
        }
        Ok(Self {
            carrier: carrier.to_owned(),
            tracking_number: tracking_number.to_owned(),
            estimated_delivery,
        })
    }
}

/// Carrier tracking recorded on an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Tracking {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OrderNotes {
    pub customer: Option<String>,
    pub internal: Option<String>,
}

/// Reasons an artisan status change is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderTransitionError {
    #[error("Order not found or access denied")]
    NotInvolved,
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Tracking information is required to ship an order")]
    TrackingRequired,
}

/// Fields supplied when placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<BillingAddress>,
    pub pricing: Pricing,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<BillingAddress>,
    pub pricing: Pricing,
    pub payment: Payment,
    pub status: OrderStatus,
    pub tracking: Option<Tracking>,
    pub notes: OrderNotes,
    #[schema(value_type = Vec<Object>)]
    pub timeline: Timeline<OrderStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Place a new pending order.
    pub fn place(
        id: OrderId,
        order_number: OrderNumber,
        new: NewOrder,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        if new.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        if new.items.iter().any(|item| item.quantity == 0) {
            return Err(OrderValidationError::ZeroQuantity);
        }
        Ok(Self {
            id,
            order_number,
            customer: new.customer,
            items: new.items,
            shipping_address: new.shipping_address.validated()?,
            billing_address: new.billing_address,
            pricing: new.pricing,
            payment: Payment {
                method: new.payment_method,
                ..Payment::default()
            },
            status: OrderStatus::Pending,
            tracking: None,
            notes: OrderNotes {
                customer: new.customer_notes,
                internal: None,
            },
            timeline: Timeline::starting_with(
                OrderStatus::Pending,
                now,
                Some("Order placed".to_owned()),
                Some(new.customer),
            ),
            created_at: now,
            updated_at: now,
        })
    }

    /// Distinct artisans selling on this order, sorted.
    pub fn artisans(&self) -> Vec<UserId> {
        let mut artisans: Vec<UserId> = self.items.iter().map(|item| item.artisan).collect();
        artisans.sort();
        artisans.dedup();
        artisans
    }

    /// Whether `artisan` sells at least one line on this order.
    pub fn involves_artisan(&self, artisan: UserId) -> bool {
        self.items.iter().any(|item| item.artisan == artisan)
    }

    /// Move the order along the artisan path.
    ///
    /// `shipment` is recorded only on the move to shipped. Returns the
    /// previous status. Nothing is modified on error.
    pub fn advance_by_artisan(
        &mut self,
        artisan: UserId,
        next: OrderStatus,
        note: Option<String>,
        shipment: Option<Shipment>,
        now: DateTime<Utc>,
    ) -> Result<OrderStatus, OrderTransitionError> {
        if !self.involves_artisan(artisan) {
            return Err(OrderTransitionError::NotInvolved);
        }
        if !self.status.artisan_may_move_to(next) {
            return Err(OrderTransitionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if next == OrderStatus::Shipped && shipment.is_none() {
            return Err(OrderTransitionError::TrackingRequired);
        }
        let note = note.unwrap_or_else(|| format!("Status updated to {next} by artisan"));
        Ok(self.record(next, note, artisan, shipment, now))
    }

    /// Set any status on behalf of an admin.
    ///
    /// Returns the previous status.
    pub fn override_status(
        &mut self,
        admin: UserId,
        next: OrderStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> OrderStatus {
        let note = note.unwrap_or_else(|| format!("Status updated to {next} by admin"));
        self.record(next, note, admin, None, now)
    }

    fn record(
        &mut self,
        next: OrderStatus,
        note: String,
        actor: UserId,
        shipment: Option<Shipment>,
        now: DateTime<Utc>,
    ) -> OrderStatus {
        let previous = self.status;
        match next {
            OrderStatus::Shipped => {
                let tracking = self.tracking.get_or_insert_with(Tracking::default);
                if let Some(shipment) = shipment {
                    tracking.carrier = Some(shipment.carrier);
                    tracking.tracking_number = Some(shipment.tracking_number);
                    tracking.estimated_delivery = Some(shipment.estimated_delivery);
                }
                tracking.shipped_date = Some(now);
            }
            OrderStatus::Delivered => {
                self.tracking.get_or_insert_with(Tracking::default).delivered_date = Some(now);
            }
            _ => {}
        }
        self.status = next;
        self.timeline.push(next, now, Some(note), Some(actor));
        self.updated_at = now;
        previous
    }
}
