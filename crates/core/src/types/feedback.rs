//! Ratings and feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Ratings at or below this value need a written explanation.
pub const DETAIL_REQUIRED_AT_OR_BELOW: u8 = 3;

/// Minimum comment length, in characters, for low ratings.
pub const MIN_DETAILED_COMMENT_CHARS: usize = 15;

/// Errors raised by the feedback submission gate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// Rating outside 1..=5.
    #[error("rating must be between 1 and 5 (got {0})")]
    InvalidRating(u8),

    /// Low rating with too short a comment.
    #[error("comment must be at least {min} characters for a rating of {rating} (got {actual})")]
    CommentTooShort {
        /// The rating that triggered the requirement.
        rating: u8,
        /// Required length.
        min: usize,
        /// Length of the submitted comment.
        actual: usize,
    },
}

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest possible rating.
    pub const MIN: u8 = 1;
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::InvalidRating`] outside 1..=5.
    pub const fn new(stars: u8) -> Result<Self, FeedbackError> {
        if stars < Self::MIN || stars > Self::MAX {
            return Err(FeedbackError::InvalidRating(stars));
        }
        Ok(Self(stars))
    }

    /// Get the number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }

    /// Whether this rating needs a detailed comment.
    #[must_use]
    pub const fn requires_detail(self) -> bool {
        self.0 <= DETAIL_REQUIRED_AT_OR_BELOW
    }

    /// Whether this rating should be offered the public review prompt.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        !self.requires_detail()
    }
}

impl TryFrom<u8> for Rating {
    type Error = FeedbackError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feedback being composed on the rating screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub rating: Rating,
    pub comment: String,
}

impl FeedbackDraft {
    /// Build a draft from raw form values.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::InvalidRating`] outside 1..=5.
    pub fn new(stars: u8, comment: impl Into<String>) -> Result<Self, FeedbackError> {
        Ok(Self {
            rating: Rating::new(stars)?,
            comment: comment.into(),
        })
    }

    /// Characters still needed before a low rating can be submitted.
    #[must_use]
    pub fn remaining_chars(&self) -> usize {
        if !self.rating.requires_detail() {
            return 0;
        }
        MIN_DETAILED_COMMENT_CHARS.saturating_sub(self.comment.chars().count())
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Enforce the comment-length gate.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::CommentTooShort`] for ratings of 1-3 with
    /// fewer than 15 characters of comment.
    pub fn validate(&self) -> Result<(), FeedbackError> {
        let actual = self.comment.chars().count();
        if self.rating.requires_detail() && actual < MIN_DETAILED_COMMENT_CHARS {
            return Err(FeedbackError::CommentTooShort {
                rating: self.rating.stars(),
                min: MIN_DETAILED_COMMENT_CHARS,
                actual,
            });
        }
        Ok(())
    }
}

/// A submitted piece of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub identity: Identity,
    pub rating: Rating,
    pub comment: String,
    /// Display date as recorded by the client.
    pub date: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
