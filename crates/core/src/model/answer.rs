use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when constructing answer values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("invalid answer value: {0} (expected 1-5)")]
    InvalidValue(u8),
}

//
// ─── ANSWER VALUE ─────────────────────────────────────────────────────────────
//

/// Five-point Likert agreement scale used by every question.
///
/// The wire protocol carries the numeric value 1-5, where 1 is
/// "strongly disagree" and 5 is "strongly agree".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerValue {
    StronglyDisagree,
    Disagree,
    Neutral,
    Agree,
    StronglyAgree,
}

impl AnswerValue {
    /// Converts a numeric scale value (1-5) to an `AnswerValue`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::InvalidValue` if the value is not in the range 1-5.
    pub fn from_u8(value: u8) -> Result<Self, AnswerError> {
        match value {
            1 => Ok(Self::StronglyDisagree),
            2 => Ok(Self::Disagree),
            3 => Ok(Self::Neutral),
            4 => Ok(Self::Agree),
            5 => Ok(Self::StronglyAgree),
            _ => Err(AnswerError::InvalidValue(value)),
        }
    }

    /// Maps this answer back to the 1-5 wire scale.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            AnswerValue::StronglyDisagree => 1,
            AnswerValue::Disagree => 2,
            AnswerValue::Neutral => 3,
            AnswerValue::Agree => 4,
            AnswerValue::StronglyAgree => 5,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
