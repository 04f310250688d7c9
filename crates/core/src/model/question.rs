use crate::model::ids::{QuestionId, TestId};

/// A single statement the user rates on the Likert scale.
///
/// Belongs to exactly one test and is immutable from the client's point of
/// view. The backend returns questions as an ordered list and the client
/// never re-sorts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub content: String,
    pub test_id: TestId,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, content: impl Into<String>, test_id: TestId) -> Self {
        Self {
            id,
            content: content.into(),
            test_id,
        }
    }
}
