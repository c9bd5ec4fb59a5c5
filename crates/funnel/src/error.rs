//! Unified error handling with Sentry integration.
//!
//! Every fallible funnel operation returns [`FunnelError`]. Views classify it
//! with [`FunnelError::kind`] and show [`FunnelError::user_message`], which
//! never includes remote-store details.

use prize_funnel_core::{FeedbackError, IdentityError, OrderId, OrderStatus, ShippingError};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::services::auth::AuthError;
use crate::session::SessionError;

/// Funnel-level error type.
#[derive(Debug, Error)]
pub enum FunnelError {
    /// No identity in the session.
    #[error("Not signed in")]
    Unauthenticated,

    /// Sign-in or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Phone input could not be parsed.
    #[error("Invalid phone: {0}")]
    Identity(#[from] IdentityError),

    /// Feedback did not pass the submission gate.
    #[error("Invalid feedback: {0}")]
    Feedback(#[from] FeedbackError),

    /// Shipping details are incomplete.
    #[error("Invalid shipping details: {0}")]
    Shipping(#[from] ShippingError),

    /// Claim attempted without a prize.
    #[error("No prize to claim")]
    MissingPrize,

    /// Order does not exist or belongs to someone else.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Order has been resolved and can no longer change.
    #[error("Order {0} is {1} and can no longer be changed")]
    OrderLocked(OrderId, OrderStatus),

    /// Remote store operation failed.
    #[error("Remote store error: {0}")]
    Remote(#[from] GatewayError),

    /// Local session store failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A background write was requested outside a Tokio runtime.
    #[error("No async runtime available for {0}")]
    NoRuntime(&'static str),
}

/// Coarse classification for views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    InvalidCredentials,
    DuplicateIdentity,
    Validation,
    RemoteError,
    Internal,
}

impl FunnelError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
                AuthError::DuplicateIdentity => ErrorKind::DuplicateIdentity,
                AuthError::InvalidPhone(_) | AuthError::EmptyPassword => ErrorKind::Validation,
                AuthError::Gateway(_) => ErrorKind::RemoteError,
                AuthError::Session(_) => ErrorKind::Internal,
            },
            Self::Identity(_)
            | Self::Feedback(_)
            | Self::Shipping(_)
            | Self::MissingPrize
            | Self::OrderNotFound(_)
            | Self::OrderLocked(..) => ErrorKind::Validation,
            Self::Remote(_) => ErrorKind::RemoteError,
            Self::Session(_) | Self::NoRuntime(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show the participant.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in first".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid phone number or password".to_string(),
                AuthError::DuplicateIdentity => {
                    "An account with this phone number already exists".to_string()
                }
                AuthError::InvalidPhone(_) => "Please enter a valid phone number".to_string(),
                AuthError::EmptyPassword => "Please enter a password".to_string(),
                AuthError::Gateway(_) | AuthError::Session(_) => {
                    "Something went wrong, please try again".to_string()
                }
            },
            Self::Identity(_) => "Please enter a valid phone number".to_string(),
            // Gate errors carry only counts and field names.
            Self::Feedback(err) => err.to_string(),
            Self::Shipping(err) => err.to_string(),
            Self::MissingPrize => "Spin the wheel before claiming a prize".to_string(),
            Self::OrderNotFound(_) => "Order not found".to_string(),
            Self::OrderLocked(_, status) => {
                format!("This order is {status} and can no longer be changed")
            }
            Self::Remote(_) | Self::Session(_) | Self::NoRuntime(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }

    /// Report a failure that the funnel deliberately swallows.
    pub fn log_swallowed(&self, operation: &'static str) {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            operation,
            sentry_event_id = %event_id,
            "Remote write failed; continuing"
        );
    }
}

/// Result type alias for `FunnelError`.
pub type Result<T> = std::result::Result<T, FunnelError>;

/// Set the Sentry user context to the signed-in identity.
pub fn set_sentry_user(identity: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a funnel action.
///
/// Breadcrumbs appear in Sentry error reports to show the steps that led
/// up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
