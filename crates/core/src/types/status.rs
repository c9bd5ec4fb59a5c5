//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Delivery lifecycle of a prize order.
///
/// The client only ever moves an order from `Pending` to `Reviewing` (when
/// shipping details are submitted). `Reviewing` resolves to `Completed` or
/// `Rejected` in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Prize claimed, no shipping details yet.
    #[default]
    Pending,
    /// Shipping details submitted, awaiting back-office review.
    Reviewing,
    /// Shipped.
    Completed,
    /// Refused by the back office (see `rejection_reason`).
    Rejected,
}

impl OrderStatus {
    /// Whether the back office has resolved this order.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Whether the shipping address can still be edited by the customer.
    #[must_use]
    pub const fn accepts_shipping_changes(self) -> bool {
        !self.is_terminal()
    }

    /// Status after the customer submits or edits shipping details.
    #[must_use]
    pub const fn after_shipping_submitted(self) -> Self {
        match self {
            Self::Pending | Self::Reviewing => Self::Reviewing,
            other => other,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Completed => write!(f, "completed"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewing" => Ok(Self::Reviewing),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
