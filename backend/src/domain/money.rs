//! Non-negative monetary amounts in minor currency units.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Basis points in one whole (100%).
const BASIS_POINTS_PER_UNIT: i64 = 10_000;

/// Error raised when an amount would be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("amount must not be negative (got {0})")]
pub struct NegativeAmount(pub i64);

/// Amount of money in minor units (cents, paise).
///
/// ## Invariants
/// - never negative; every constructor and arithmetic helper preserves this.
///
/// # Examples
/// ```
/// use karigari::domain::Money;
///
/// let price = Money::from_minor(2_500).unwrap();
/// assert_eq!(price.times(3), Some(Money::from_minor(7_500).unwrap()));
/// assert!(Money::from_minor(-1).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
#[schema(value_type = i64, example = 2500)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Validate an amount in minor units.
    pub const fn from_minor(minor: i64) -> Result<Self, NegativeAmount> {
        if minor < 0 {
            Err(NegativeAmount(minor))
        } else {
            Ok(Self(minor))
        }
    }

    /// Amount in minor units.
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Sum of two amounts, `None` on overflow.
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Difference of two amounts, `None` when it would go negative.
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }

    /// Amount multiplied by a quantity, `None` on overflow.
    pub fn times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Share of the amount expressed in basis points, rounded down.
    pub fn basis_points(self, bps: u32) -> Option<Self> {
        self.0
            .checked_mul(i64::from(bps))
            .map(|scaled| Self(scaled / BASIS_POINTS_PER_UNIT))
    }
}

impl TryFrom<i64> for Money {
    type Error = NegativeAmount;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_minor(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
