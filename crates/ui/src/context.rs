use std::sync::Arc;

use services::{GameEngine, QuestionService, TopicService};

pub trait UiApp: Send + Sync {
    fn topics(&self) -> Arc<TopicService>;
    fn questions(&self) -> Arc<QuestionService>;
    fn games(&self) -> Arc<GameEngine>;
}

#[derive(Clone)]
pub struct AppContext {
    topics: Arc<TopicService>,
    questions: Arc<QuestionService>,
    games: Arc<GameEngine>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            topics: app.topics(),
            questions: app.questions(),
            games: app.games(),
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

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
