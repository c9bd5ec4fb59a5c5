//! Prize orders.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::identity::Identity;
use super::shipping::ShippingInfo;
use super::status::OrderStatus;

/// Prefix shared by every generated order number.
pub const ORDER_NO_PREFIX: &str = "RTD-";

/// Range of the random suffix appended to generated order numbers.
pub const ORDER_NO_SUFFIX_RANGE: std::ops::RangeInclusive<u16> = 100..=999;

/// Human-readable order code, e.g. `RTD-123456789`.
///
/// Generated client-side from the clock and a random suffix. Two clients
/// claiming in the same millisecond window can collide; nothing checks the
/// store for an existing code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number from epoch milliseconds and a suffix.
    ///
    /// Uses the last six digits of `epoch_millis` (zero padded) followed by
    /// `suffix`, which callers draw from [`ORDER_NO_SUFFIX_RANGE`].
    #[must_use]
    pub fn from_parts(epoch_millis: i64, suffix: u16) -> Self {
        let tail = epoch_millis.rem_euclid(1_000_000);
        Self(format!("{ORDER_NO_PREFIX}{tail:06}{suffix:03}"))
    }

    /// Build an order number for the given instant.
    #[must_use]
    pub fn at(now: DateTime<Utc>, suffix: u16) -> Self {
        Self::from_parts(now.timestamp_millis(), suffix)
    }

    /// Whether the value has the `RTD-` + nine digits shape.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(ORDER_NO_PREFIX)
            .is_some_and(|rest| rest.len() == 9 && rest.chars().all(|c| c.is_ascii_digit()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Carrier details filled in by the back office once an order ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub carrier: Option<String>,
    pub tracking_no: Option<String>,
    pub ship_date: Option<NaiveDate>,
}

impl Tracking {
    /// Whether any tracking field has been set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.carrier.is_none() && self.tracking_no.is_none() && self.ship_date.is_none()
    }
}

/// The durable record of a won prize plus its delivery lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_no: OrderNumber,
    pub identity: Identity,
    pub prize: String,
    pub status: OrderStatus,
    pub shipping: ShippingInfo,
    pub rejection_reason: Option<String>,
    pub tracking: Option<Tracking>,
    pub created_at: DateTime<Utc>,
}
