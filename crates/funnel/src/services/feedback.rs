//! Rating submission.

use chrono::{DateTime, Utc};
use prize_funnel_core::{Feedback, FeedbackDraft, Identity};

use crate::error::{FunnelError, Result};
use crate::gateway::{NewFeedbackRow, PersistenceGateway};

/// Display date stored alongside each rating, e.g. `2024/6/1`.
fn display_date(now: DateTime<Utc>) -> String {
    now.format("%Y/%-m/%-d").to_string()
}

/// Feedback service.
pub struct FeedbackService<'a> {
    gateway: &'a dyn PersistenceGateway,
}

impl<'a> FeedbackService<'a> {
    #[must_use]
    pub const fn new(gateway: &'a dyn PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Record a rating and comment.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::Feedback` for a rating outside 1..=5 or a low
    /// rating with a short comment, and `FunnelError::Unauthenticated`
    /// without an identity, all before any remote call.
    pub async fn submit_feedback(
        &self,
        identity: Option<&Identity>,
        rating: u8,
        comment: &str,
    ) -> Result<Feedback> {
        let draft = FeedbackDraft::new(rating, comment)?;
        draft.validate()?;
        let identity = identity.ok_or(FunnelError::Unauthenticated)?;

        let row = NewFeedbackRow::new(
            identity,
            draft.rating,
            &draft.comment,
            display_date(Utc::now()),
        );
        let feedback = Feedback::try_from(self.gateway.insert_feedback(&row).await?)?;

        tracing::info!(identity = %identity, rating = %feedback.rating, "Feedback submitted");
        Ok(feedback)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use prize_funnel_core::FeedbackError;

    use super::*;
    use crate::gateway::MemoryGateway;

    fn identity() -> Identity {
        Identity::parse("5551234567").unwrap()
    }

    #[test]
    fn test_display_date_has_no_padding() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(display_date(date), "2024/6/1");
    }

    #[tokio::test]
    async fn test_submit_feedback_writes_identity_twice() {
        let gateway = MemoryGateway::new();
        let service = FeedbackService::new(&gateway);

        let feedback = service
            .submit_feedback(Some(&identity()), 2, "The flavor was far too sweet")
            .await
            .unwrap();

        assert_eq!(feedback.rating.stars(), 2);
        let rows = gateway.feedbacks();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user, "+15551234567");
        assert_eq!(rows[0].phone.as_deref(), Some("+15551234567"));
    }

    #[tokio::test]
    async fn test_gate_checked_before_remote_call() {
        let gateway = MemoryGateway::new();
        let service = FeedbackService::new(&gateway);

        let err = service
            .submit_feedback(Some(&identity()), 3, "too short")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FunnelError::Feedback(FeedbackError::CommentTooShort { .. })
        ));

        let err = service
            .submit_feedback(Some(&identity()), 0, "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FunnelError::Feedback(FeedbackError::InvalidRating(0))
        ));

        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_high_rating_needs_no_comment() {
        let gateway = MemoryGateway::new();
        let service = FeedbackService::new(&gateway);

        assert!(
            service
                .submit_feedback(Some(&identity()), 5, "")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_requires_identity() {
        let gateway = MemoryGateway::new();
        let service = FeedbackService::new(&gateway);

        assert!(matches!(
            service.submit_feedback(None, 5, "").await,
            Err(FunnelError::Unauthenticated)
        ));
    }
}
