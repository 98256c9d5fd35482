use chrono::{DateTime, Utc};

use quiz_core::model::{AnswerOption, Game, GameQuestion, GameToken, Question, TopicId};
use storage::repository::GameListRecord;

/// Everything needed to render the question a game is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaySlot {
    pub game: Game,
    pub slot: GameQuestion,
    pub question: Question,
    pub options: Vec<AnswerOption>,
    pub total: u32,
}

impl PlaySlot {
    /// 1-based number of the current question.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.slot.order()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.slot.order() == self.total
    }
}

/// Outcome of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameAnswerResult {
    /// The game after advancing.
    pub game: Game,
    /// The slot that was just answered.
    pub slot: GameQuestion,
    pub is_correct: bool,
    pub correct_option: Option<AnswerOption>,
    pub explanation: Option<String>,
}

impl GameAnswerResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.game.is_complete()
    }
}

/// Presentation-agnostic row of the game list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameListItem {
    pub token: GameToken,
    pub topic_id: TopicId,
    pub topic_name: String,
    pub answered: u32,
    pub total: u32,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl GameListItem {
    #[must_use]
    pub fn from_record(record: &GameListRecord) -> Self {
        Self {
            token: record.game.token(),
            topic_id: record.game.topic_id(),
            topic_name: record.topic_name.clone(),
            answered: record.answered,
            total: record.total,
            is_complete: record.game.is_complete(),
            created_at: record.game.created_at(),
        }
    }
}
