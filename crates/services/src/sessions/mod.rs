mod collector;
mod flow;
mod progress;

// Public API of the session subsystem.
pub use crate::error::{CollectorError, FlowError};
pub use collector::{AnswerCollector, AnswerMap};
pub use flow::{SessionFlow, SessionState};
pub use progress::SessionProgress;
