#![forbid(unsafe_code)]

pub mod model;

pub use model::{
    AnswerError, AnswerValue, Feedback, FeedbackDraft, FeedbackError, ParseIdError, Question,
    QuestionId, Rating, Role, Session, SessionId, Test, TestHistoryEntry, TestId, TestResult,
    User, UserError, slug_of,
};
