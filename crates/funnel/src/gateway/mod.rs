//! Access to the remote `users`, `orders`, and `feedbacks` tables.
//!
//! Everything above this module talks to a [`PersistenceGateway`]. The
//! production implementation is [`PostgrestGateway`]; when no remote store
//! is configured, [`DisconnectedGateway`] fails every call so the funnel
//! degrades exactly as it would during an outage.

mod conversions;
mod disconnected;
#[cfg(any(test, feature = "test-util"))]
mod memory;
mod postgrest;
mod rows;

use std::sync::Arc;

use async_trait::async_trait;
use prize_funnel_core::{Credential, Identity, OrderId};
use thiserror::Error;

pub use disconnected::DisconnectedGateway;
#[cfg(any(test, feature = "test-util"))]
pub use memory::{GatewayOp, MemoryGateway};
pub use postgrest::PostgrestGateway;
pub use rows::{FeedbackRow, NewFeedbackRow, NewOrderRow, OrderRow, ShippingColumns, ShippingPatch, UserRow};

use crate::config::GatewayConfig;

/// Postgres error code for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A row could not be mapped onto a domain type.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No remote store is configured.
    #[error("remote store is not configured")]
    NotConfigured,
}

impl GatewayError {
    /// Whether the store rejected the write as a duplicate.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Row-level operations the funnel needs from the remote store.
///
/// Reads filtered "latest" return the newest row by `created_at`, or `None`.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert a `users` row.
    ///
    /// Fails with [`GatewayError::Conflict`] when the phone already exists.
    async fn insert_user(&self, credential: &Credential) -> Result<(), GatewayError>;

    /// Find the `users` row matching both phone and password.
    async fn find_user(&self, credential: &Credential) -> Result<Option<UserRow>, GatewayError>;

    /// Insert an `orders` row and return it as stored.
    async fn insert_order(&self, order: &NewOrderRow) -> Result<OrderRow, GatewayError>;

    /// Newest order whose `name` is the identity.
    async fn latest_order(&self, identity: &Identity) -> Result<Option<OrderRow>, GatewayError>;

    /// All orders for the identity, newest first.
    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderRow>, GatewayError>;

    /// One order, only if it belongs to the identity.
    async fn find_order(
        &self,
        identity: &Identity,
        id: OrderId,
    ) -> Result<Option<OrderRow>, GatewayError>;

    /// Overwrite the shipping columns and status of an order.
    async fn update_order(
        &self,
        id: OrderId,
        patch: &ShippingPatch,
    ) -> Result<OrderRow, GatewayError>;

    /// Insert a `feedbacks` row and return it as stored.
    async fn insert_feedback(&self, feedback: &NewFeedbackRow)
    -> Result<FeedbackRow, GatewayError>;

    /// Newest feedback whose `user` is the identity.
    async fn latest_feedback(
        &self,
        identity: &Identity,
    ) -> Result<Option<FeedbackRow>, GatewayError>;
}

/// Build the gateway for the given remote configuration.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built.
pub fn connect(
    config: Option<&GatewayConfig>,
) -> Result<Arc<dyn PersistenceGateway>, GatewayError> {
    if let Some(config) = config {
        tracing::info!(url = %config.url, "Using Supabase remote store");
        Ok(Arc::new(PostgrestGateway::new(config)?))
    } else {
        tracing::warn!("SUPABASE_URL not set; remote reads and writes will fail");
        Ok(Arc::new(DisconnectedGateway))
    }
}

#[cfg(test)]
mockall::mock! {
    pub Gateway {}

    #[async_trait]
    impl PersistenceGateway for Gateway {
        async fn insert_user(&self, credential: &Credential) -> Result<(), GatewayError>;
        async fn find_user(&self, credential: &Credential) -> Result<Option<UserRow>, GatewayError>;
        async fn insert_order(&self, order: &NewOrderRow) -> Result<OrderRow, GatewayError>;
        async fn latest_order(&self, identity: &Identity) -> Result<Option<OrderRow>, GatewayError>;
        async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderRow>, GatewayError>;
        async fn find_order(
            &self,
            identity: &Identity,
            id: OrderId,
        ) -> Result<Option<OrderRow>, GatewayError>;
        async fn update_order(
            &self,
            id: OrderId,
            patch: &ShippingPatch,
        ) -> Result<OrderRow, GatewayError>;
        async fn insert_feedback(
            &self,
            feedback: &NewFeedbackRow,
        ) -> Result<FeedbackRow, GatewayError>;
        async fn latest_feedback(
            &self,
            identity: &Identity,
        ) -> Result<Option<FeedbackRow>, GatewayError>;
    }
}
