use thiserror::Error;

use crate::model::ids::TestId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while validating feedback input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("invalid feedback rating: {0} (expected 1-5)")]
    InvalidRating(u8),

    #[error("feedback content must not be blank")]
    BlankContent,
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// A 1-5 star rating attached to feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    /// Builds a rating from the 1-5 scale.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidRating` if the value is outside 1-5.
    pub fn new(value: u8) -> Result<Self, FeedbackError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FeedbackError::InvalidRating(value))
        }
    }

    /// Returns the underlying 1-5 value
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

//
// ─── FEEDBACK ─────────────────────────────────────────────────────────────────
//

/// Raw feedback input as collected from the user, prior to validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub rating: u8,
    pub content: String,
    pub test_id: TestId,
}

impl FeedbackDraft {
    /// Validate the draft into submittable feedback.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidRating` for a rating outside 1-5 and
    /// `FeedbackError::BlankContent` for whitespace-only content.
    pub fn validate(self) -> Result<Feedback, FeedbackError> {
        let rating = Rating::new(self.rating)?;
        let content = self.content.trim();
        if content.is_empty() {
            return Err(FeedbackError::BlankContent);
        }

        Ok(Feedback {
            rating,
            content: content.to_string(),
            test_id: self.test_id,
        })
    }
}

/// Validated feedback for a completed test, ready to send.
///
/// Created at most once per completed session at the user's discretion;
/// independent of the session lifecycle and never required for the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub rating: Rating,
    pub content: String,
    pub test_id: TestId,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_draft_passes() {
        let feedback = FeedbackDraft {
            rating: 4,
            content: "  helpful test  ".to_string(),
            test_id: TestId::new(7),
        }
        .validate()
        .unwrap();

        assert_eq!(feedback.rating.value(), 4);
        assert_eq!(feedback.content, "helpful test");
        assert_eq!(feedback.test_id, TestId::new(7));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let err = FeedbackDraft {
            rating: 0,
            content: "x".to_string(),
            test_id: TestId::new(1),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, FeedbackError::InvalidRating(0)));

        let err = Rating::new(6).unwrap_err();
        assert!(matches!(err, FeedbackError::InvalidRating(6)));
    }

    #[test]
    fn blank_content_is_rejected() {
        let err = FeedbackDraft {
            rating: 3,
            content: "   ".to_string(),
            test_id: TestId::new(1),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, FeedbackError::BlankContent));
    }
}
