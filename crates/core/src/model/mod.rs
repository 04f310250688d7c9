mod answer;
mod feedback;
mod ids;
mod question;
mod session;
mod user;

pub use answer::{AnswerError, AnswerValue};
pub use feedback::{Feedback, FeedbackDraft, FeedbackError, Rating};
pub use ids::{ParseIdError, QuestionId, SessionId, TestId};
pub use question::Question;
pub use session::{Session, TestHistoryEntry, TestResult};
pub use test::{Test, slug_of};
pub use user::{Role, User, UserError};
