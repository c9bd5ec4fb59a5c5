//! Core types for the prize funnel.
//!
//! This module provides type-safe wrappers for the funnel's domain concepts.

pub mod credential;
pub mod feedback;
pub mod id;
pub mod identity;
pub mod locale;
pub mod order;
pub mod shipping;
pub mod status;
pub mod user_state;

pub use credential::Credential;
pub use feedback::{
    DETAIL_REQUIRED_AT_OR_BELOW, Feedback, FeedbackDraft, FeedbackError,
    MIN_DETAILED_COMMENT_CHARS, Rating,
};
pub use id::*;
pub use identity::{Identity, IdentityError, normalize_phone};
pub use locale::Language;
pub use order::{ORDER_NO_PREFIX, ORDER_NO_SUFFIX_RANGE, Order, OrderNumber, Tracking};
pub use shipping::{ShippingError, ShippingInfo};
pub use status::OrderStatus;
pub use user_state::{ProfileSnapshot, UserState};
