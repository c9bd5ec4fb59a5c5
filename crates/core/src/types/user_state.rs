//! Local projection of the participant's progress.
//!
//! `UserState` is never persisted. It is rebuilt from the latest remote
//! order and feedback rows on load, then patched optimistically as the
//! participant completes each step.

use serde::{Deserialize, Serialize};

use super::feedback::Rating;
use super::identity::Identity;
use super::shipping::ShippingInfo;

/// What the funnel screens know about the current participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub has_spun: bool,
    pub prize: Option<String>,
    pub rating: Option<Rating>,
    pub feedback: String,
    pub shipping_info: Option<ShippingInfo>,
}

/// Remote data projected for one identity.
///
/// Produced by the profile synchronizer. `identity` records who the rows
/// were loaded for, so a result arriving after a session switch can be
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub identity: Identity,
    pub has_spun: bool,
    pub prize: Option<String>,
    pub rating: Option<Rating>,
    pub feedback: Option<String>,
    pub shipping_info: Option<ShippingInfo>,
}

impl UserState {
    /// Rating as shown by the star widget (0 when unrated).
    #[must_use]
    pub fn rating_value(&self) -> u8 {
        self.rating.map_or(0, Rating::stars)
    }

    /// Whether a prize has been claimed with shipping details.
    #[must_use]
    pub const fn has_order(&self) -> bool {
        self.shipping_info.is_some()
    }

    /// Record a wheel result.
    pub fn record_win(&mut self, prize: impl Into<String>) {
        self.has_spun = true;
        self.prize = Some(prize.into());
    }

    /// Record a rating and comment.
    pub fn record_feedback(&mut self, rating: Rating, comment: impl Into<String>) {
        self.rating = Some(rating);
        self.feedback = comment.into();
    }

    /// Record shipping details.
    pub fn record_shipping(&mut self, info: ShippingInfo) {
        self.shipping_info = Some(info);
    }

    /// Overlay a snapshot loaded from the remote store.
    ///
    /// Order-derived fields are replaced wholesale. Feedback fields are only
    /// replaced when the snapshot found a feedback row, so local feedback
    /// typed before the first sync is not wiped by an empty result.
    pub fn apply_profile(&mut self, snapshot: ProfileSnapshot) {
        self.has_spun = snapshot.has_spun;
        self.prize = snapshot.prize;
        self.shipping_info = snapshot.shipping_info;

        if let Some(rating) = snapshot.rating {
            self.rating = Some(rating);
        }
        if let Some(feedback) = snapshot.feedback {
            self.feedback = feedback;
        }
    }
}
