//! Gateway used when no remote store is configured.

use async_trait::async_trait;
use prize_funnel_core::{Credential, Identity, OrderId};

use super::rows::{FeedbackRow, NewFeedbackRow, NewOrderRow, OrderRow, ShippingPatch, UserRow};
use super::{GatewayError, PersistenceGateway};

/// Fails every call with [`GatewayError::NotConfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedGateway;

#[async_trait]
impl PersistenceGateway for DisconnectedGateway {
    async fn insert_user(&self, _credential: &Credential) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn find_user(&self, _credential: &Credential) -> Result<Option<UserRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn insert_order(&self, _order: &NewOrderRow) -> Result<OrderRow, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn latest_order(&self, _identity: &Identity) -> Result<Option<OrderRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn list_orders(&self, _identity: &Identity) -> Result<Vec<OrderRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn find_order(
        &self,
        _identity: &Identity,
        _id: OrderId,
    ) -> Result<Option<OrderRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn update_order(
        &self,
        _id: OrderId,
        _patch: &ShippingPatch,
    ) -> Result<OrderRow, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn insert_feedback(
        &self,
        _feedback: &NewFeedbackRow,
    ) -> Result<FeedbackRow, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn latest_feedback(
        &self,
        _identity: &Identity,
    ) -> Result<Option<FeedbackRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_fails_not_configured() {
        let gateway = DisconnectedGateway;
        let identity = Identity::parse("5551234567").unwrap();

        assert!(matches!(
            gateway.latest_order(&identity).await,
            Err(GatewayError::NotConfigured)
        ));
        assert!(matches!(
            gateway.list_orders(&identity).await,
            Err(GatewayError::NotConfigured)
        ));
        assert!(matches!(
            gateway
                .insert_user(&Credential::new(identity, "pw".to_string()))
                .await,
            Err(GatewayError::NotConfigured)
        ));
    }
}
