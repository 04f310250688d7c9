use std::collections::HashMap;
use std::fmt;

use persona_core::{AnswerValue, Question, QuestionId};

use super::progress::SessionProgress;
use crate::error::CollectorError;

/// Per-question answers keyed by question id; insertion order is irrelevant.
pub type AnswerMap = HashMap<QuestionId, AnswerValue>;

//
// ─── ANSWER COLLECTOR ─────────────────────────────────────────────────────────
//

/// Client-side state for one pass through a question set.
///
/// Tracks the question the user is looking at and the answers given so far.
/// Navigation is deliberately not gated on the current question being
/// answered; the caller decides whether to allow advancing via
/// [`AnswerCollector::is_current_answered`]. Completion
/// ([`AnswerCollector::is_complete`]) is the single precondition for
/// submission.
pub struct AnswerCollector {
    questions: Vec<Question>,
    current: usize,
    answers: AnswerMap,
}

impl AnswerCollector {
    /// Build a collector over an ordered, non-empty question set.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::Empty` if no questions are provided.
    pub fn new(questions: Vec<Question>) -> Result<Self, CollectorError> {
        if questions.is_empty() {
            return Err(CollectorError::Empty);
        }

        Ok(Self {
            questions,
            current: 0,
            answers: AnswerMap::new(),
        })
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions answered so far.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Zero-based index of the question the user is looking at.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question the user is looking at.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` is clamped to [0, len-1] and the set is non-empty.
        &self.questions[self.current]
    }

    /// Record or overwrite the answer for a question.
    ///
    /// Never advances the current index; repeated calls for the same
    /// question keep the answered count unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::UnknownQuestion` for an id outside the
    /// loaded set, leaving state untouched.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        value: AnswerValue,
    ) -> Result<(), CollectorError> {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(CollectorError::UnknownQuestion(question_id));
        }

        self.answers.insert(question_id, value);
        Ok(())
    }

    /// Move to the next question; no-op on the last one.
    pub fn next(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move to the previous question; no-op on the first one.
    pub fn previous(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    /// Whether the question the user is looking at has an answer.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.answers.contains_key(&self.current_question().id)
    }

    /// Whether every loaded question has an answer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// Answered share in `[0, 1]`.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        self.progress().fraction()
    }

    /// Returns a summary of the current answering progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            is_complete: self.is_complete(),
        }
    }

    /// Snapshot of all answers, for submission.
    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }
}

impl fmt::Debug for AnswerCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerCollector")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
