//! User accounts: identity, role, moderation status and profile data.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ProductId, UserId};

/// Maximum accepted length for a person's name.
pub const NAME_MAX: usize = 100;

/// Validation errors returned by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was blank once trimmed.
    EmptyName,
    /// Name exceeded [`NAME_MAX`] characters.
    NameTooLong { max: usize },
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Email did not have the `local@domain` shape.
    InvalidEmail,
    /// Rating fell outside 0..=5.
    RatingOutOfRange,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::RatingOutOfRange => write!(f, "rating must be between 0 and 5"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Trimmed, non-empty name of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Asha Verma")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower-cased, trimmed email address.
///
/// Equality is therefore case-insensitive with respect to the raw input,
/// which is what the uniqueness constraint on accounts relies on.
///
/// # Examples
/// ```
/// use karigari::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Asha@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "asha@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "asha@example.com")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = normalised.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = !domain.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.');
        if local.is_empty() || !domain_ok || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Marketplace role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Buys products and requests customizations.
    Customer,
    /// Sells products once approved.
    Artisan,
    /// Artisan whose approval is still outstanding.
    ArtisanPending,
    /// Moderates accounts, products and orders.
    Admin,
}

impl Role {
    /// Stable wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Artisan => "artisan",
            Self::ArtisanPending => "artisan-pending",
            Self::Admin => "admin",
        }
    }

    /// Parse the wire representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "customer" => Some(Self::Customer),
            "artisan" => Some(Self::Artisan),
            "artisan-pending" => Some(Self::ArtisanPending),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether the role sells products, approved or not.
    pub const fn is_artisan(self) -> bool {
        matches!(self, Self::Artisan | Self::ArtisanPending)
    }

    /// Moderation status assigned to freshly registered accounts.
    pub const fn initial_status(self) -> AccountStatus {
        if self.is_artisan() {
            AccountStatus::Pending
        } else {
            AccountStatus::Approved
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Awaiting admin review.
    Pending,
    /// Fully active.
    Approved,
    /// Refused by an admin.
    Rejected,
    /// Blocked from signing in.
    Suspended,
}

impl AccountStatus {
    /// Stable wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }

    /// Parse the wire representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address; every line is optional on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Social media links shown on artisan profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub website: Option<String>,
}

/// Self-described profile information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub address: Address,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub social_links: SocialLinks,
}

/// Aggregated sales figures maintained for each account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_orders: u64,
    /// Sum of order totals in minor currency units.
    pub total_sales: u64,
    pub rating: f64,
    pub review_count: u64,
}

/// Changes a user may make to their own account. `None` keeps the stored
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<PersonName>,
    pub profile: Option<Profile>,
}

/// A registered account.
///
/// The password hash is deliberately not part of this type; repositories
/// return it alongside the user when authentication needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: PersonName,
    pub email: EmailAddress,
    pub role: Role,
    pub status: AccountStatus,
    pub profile: Profile,
    pub stats: UserStats,
    pub favorites: Vec<ProductId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a newly registered account with role-dependent initial status.
    pub fn register(
        id: UserId,
        name: PersonName,
        email: EmailAddress,
        role: Role,
        profile: Profile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            role,
            status: role.initial_status(),
            profile,
            stats: UserStats::default(),
            favorites: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a self-service profile edit.
    pub fn apply_profile(&mut self, update: &ProfileUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(profile) = &update.profile {
            self.profile = profile.clone();
        }
        self.updated_at = now;
    }

    /// Apply an admin moderation decision.
    ///
    /// Approving an `artisan-pending` account promotes it to `artisan`.
    pub fn moderate(&mut self, status: AccountStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == AccountStatus::Approved && self.role == Role::ArtisanPending {
            self.role = Role::Artisan;
        }
        self.updated_at = now;
    }

    /// Add a product to favorites; returns `false` when already present.
    pub fn add_favorite(&mut self, product: ProductId, now: DateTime<Utc>) -> bool {
        if self.favorites.contains(&product) {
            return false;
        }
        self.favorites.push(product);
        self.updated_at = now;
        true
    }

    /// Remove a product from favorites; returns `false` when absent.
    pub fn remove_favorite(&mut self, product: ProductId, now: DateTime<Utc>) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|id| *id != product);
        let removed = self.favorites.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }
}
