//! Rebuild local progress from remote rows.

use prize_funnel_core::{Feedback, Identity, ProfileSnapshot, ShippingInfo};

use crate::gateway::{GatewayError, OrderRow, PersistenceGateway};

/// Loads the newest order and feedback for an identity.
pub struct ProfileSynchronizer<'a> {
    gateway: &'a dyn PersistenceGateway,
}

impl<'a> ProfileSynchronizer<'a> {
    #[must_use]
    pub const fn new(gateway: &'a dyn PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Project the identity's remote rows into a snapshot.
    ///
    /// Returns `None` without an identity (no remote call is made) and on
    /// any remote failure. `None` means "unknown"; callers leave local
    /// state as it is. The order's status plays no part in the snapshot, and
    /// an unreadable feedback row is logged and treated as absent.
    pub async fn load_profile(&self, identity: Option<&Identity>) -> Option<ProfileSnapshot> {
        let identity = identity?;

        match self.fetch(identity).await {
            Ok(snapshot) => {
                tracing::debug!(
                    identity = %identity,
                    has_spun = snapshot.has_spun,
                    "Profile loaded"
                );
                Some(snapshot)
            }
            Err(e) => {
                tracing::error!(identity = %identity, error = %e, "Failed to load profile");
                None
            }
        }
    }

    async fn fetch(&self, identity: &Identity) -> Result<ProfileSnapshot, GatewayError> {
        let (order, feedback) = tokio::join!(
            self.gateway.latest_order(identity),
            self.gateway.latest_feedback(identity),
        );

        let claim = order?.map(OrderRow::into_claim);
        let feedback = feedback?.and_then(|row| {
            Feedback::try_from(row)
                .inspect_err(|e| {
                    tracing::warn!(identity = %identity, error = %e, "Ignoring unreadable feedback");
                })
                .ok()
        });

        Ok(project(identity.clone(), claim, feedback))
    }
}

fn project(
    identity: Identity,
    claim: Option<(String, ShippingInfo)>,
    feedback: Option<Feedback>,
) -> ProfileSnapshot {
    let (rating, feedback) = feedback.map_or((None, None), |f| (Some(f.rating), Some(f.comment)));

    match claim {
        Some((prize, shipping)) => ProfileSnapshot {
            identity,
            has_spun: true,
            prize: Some(prize),
            rating,
            feedback,
            shipping_info: Some(shipping),
        },
        None => ProfileSnapshot {
            identity,
            has_spun: false,
            prize: None,
            rating,
            feedback,
            shipping_info: None,
        },
    }
}
