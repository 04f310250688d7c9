use std::sync::Arc;

use tracing::debug;

use persona_core::{Question, Test, TestId};

use crate::error::CatalogError;
use crate::gateway::TestBackend;

/// Resolves human-readable test slugs and loads question sets.
///
/// Nothing is cached: every navigation re-fetches the catalog and re-derives
/// the slug, matching how the backend expects to stay the single source of
/// truth.
#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn TestBackend>,
}

impl CatalogService {
    #[must_use]
    pub fn new(backend: Arc<dyn TestBackend>) -> Self {
        Self { backend }
    }

    /// Find the test whose derived slug matches `slug`.
    ///
    /// The catalog is scanned in backend order and the first match wins.
    /// Two tests whose titles collapse to the same slug are therefore
    /// ambiguous; the backend is expected to keep titles distinct.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSlug` when nothing matches and
    /// `CatalogError::Api` for transport or server failures.
    pub async fn resolve_test(&self, slug: &str) -> Result<Test, CatalogError> {
        let tests = self.backend.list_tests().await?;
        debug!(slug, catalog_size = tests.len(), "resolving test slug");

        tests
            .into_iter()
            .find(|test| test.slug() == slug)
            .ok_or_else(|| CatalogError::UnknownSlug(slug.to_string()))
    }

    /// Load the ordered question list for a test.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoQuestions` for a test with an empty set (the
    /// UI renders that as missing content, not as a server failure) and
    /// `CatalogError::Api` otherwise.
    pub async fn load_questions(&self, test_id: TestId) -> Result<Vec<Question>, CatalogError> {
        let questions = self.backend.questions_for_test(test_id).await?;
        if questions.is_empty() {
            return Err(CatalogError::NoQuestions(test_id));
        }
        Ok(questions)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryBackend;
    use persona_core::QuestionId;

    fn backend_with_catalog() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend.add_test(
            Test {
                id: TestId::new(1),
                title: "MBTI Test".to_string(),
                description: "16 types".to_string(),
                created_at: None,
            },
            vec![Question::new(QuestionId::new(1), "Q1", TestId::new(1))],
        );
        backend.add_test(
            Test {
                id: TestId::new(2),
                title: "Big Five".to_string(),
                description: "OCEAN".to_string(),
                created_at: None,
            },
            Vec::new(),
        );
        backend
    }

    #[tokio::test]
    async fn known_slug_resolves_to_its_test() {
        let catalog = CatalogService::new(Arc::new(backend_with_catalog()));
        let test = catalog.resolve_test("mbti-test").await.unwrap();
        assert_eq!(test.id, TestId::new(1));
        assert_eq!(test.title, "MBTI Test");
    }

    #[tokio::test]
    async fn unknown_slug_is_not_a_transport_failure() {
        let catalog = CatalogService::new(Arc::new(backend_with_catalog()));
        let err = catalog.resolve_test("unknown-test").await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSlug(slug) if slug == "unknown-test"));
    }

    #[tokio::test]
    async fn first_match_wins_on_slug_collision() {
        let backend = backend_with_catalog();
        backend.add_test(
            Test {
                id: TestId::new(3),
                title: "MBTI  TEST".to_string(),
                description: "duplicate slug".to_string(),
                created_at: None,
            },
            Vec::new(),
        );

        let catalog = CatalogService::new(Arc::new(backend));
        let test = catalog.resolve_test("mbti-test").await.unwrap();
        assert_eq!(test.id, TestId::new(1));
    }

    #[tokio::test]
    async fn empty_question_set_is_reported_as_missing_content() {
        let catalog = CatalogService::new(Arc::new(backend_with_catalog()));
        let err = catalog.load_questions(TestId::new(2)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NoQuestions(id) if id == TestId::new(2)));
    }

    #[tokio::test]
    async fn questions_keep_backend_order() {
        let backend = InMemoryBackend::new();
        let test_id = TestId::new(9);
        backend.add_test(
            Test {
                id: test_id,
                title: "Enneagram".to_string(),
                description: String::new(),
                created_at: None,
            },
            vec![
                Question::new(QuestionId::new(30), "third", test_id),
                Question::new(QuestionId::new(10), "first", test_id),
                Question::new(QuestionId::new(20), "second", test_id),
            ],
        );

        let catalog = CatalogService::new(Arc::new(backend));
        let questions = catalog.load_questions(test_id).await.unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id.value()).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }
}
