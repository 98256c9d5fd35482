use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::games::GameEngine;
use crate::question_service::QuestionService;
use crate::topic_service::TopicService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    topics: Arc<TopicService>,
    questions: Arc<QuestionService>,
    games: Arc<GameEngine>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if connecting or migrating fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let topics = Arc::new(TopicService::new(clock, Arc::clone(&storage.topics)));
        let questions = Arc::new(QuestionService::new(
            clock,
            Arc::clone(&storage.topics),
            Arc::clone(&storage.questions),
        ));
        let games = Arc::new(GameEngine::new(
            clock,
            Arc::clone(&storage.topics),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.games),
        ));
        Self {
            topics,
            questions,
            games,
        }
    }

    #[must_use]
    pub fn topics(&self) -> Arc<TopicService> {
        Arc::clone(&self.topics)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn games(&self) -> Arc<GameEngine> {
        Arc::clone(&self.games)
    }
}
