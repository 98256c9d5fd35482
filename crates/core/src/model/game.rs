use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{GameId, GameQuestionId, GameToken, OptionId, QuestionId, TopicId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameStateError {
    #[error("game is already complete")]
    AlreadyComplete,

    #[error("slot {0:?} is not the current slot")]
    NotCurrentSlot(GameQuestionId),

    #[error("slot {0:?} was already answered")]
    SlotAlreadyAnswered(GameQuestionId),

    #[error("slot orders must be 1..={expected_last} without gaps")]
    InvalidOrders { expected_last: usize },

    #[error("invalid persisted state: {0}")]
    InvalidPersistedState(String),
}

/// Where a game currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Active { slot: GameQuestionId },
    Complete,
}

//
// ─── GAME ──────────────────────────────────────────────────────────────────────
//

/// One randomized quiz session over a topic.
///
/// `current_slot` is `None` exactly when the game is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: GameId,
    token: GameToken,
    topic_id: TopicId,
    current_slot: Option<GameQuestionId>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Creates an active game pointing at its first slot.
    #[must_use]
    pub fn start(
        id: GameId,
        token: GameToken,
        topic_id: TopicId,
        first_slot: GameQuestionId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            token,
            topic_id,
            current_slot: Some(first_slot),
            created_at,
            completed_at: None,
        }
    }

    /// Rehydrate a game from storage.
    ///
    /// # Errors
    ///
    /// Returns `GameStateError::InvalidPersistedState` when the completion flag
    /// disagrees with the current slot pointer.
    pub fn from_persisted(
        id: GameId,
        token: GameToken,
        topic_id: TopicId,
        current_slot: Option<GameQuestionId>,
        is_complete: bool,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, GameStateError> {
        if is_complete != current_slot.is_none() {
            return Err(GameStateError::InvalidPersistedState(format!(
                "is_complete={is_complete} but current_slot={current_slot:?}"
            )));
        }
        Ok(Self {
            id,
            token,
            topic_id,
            current_slot,
            created_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    #[must_use]
    pub fn token(&self) -> GameToken {
        self.token
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn current_slot(&self) -> Option<GameQuestionId> {
        self.current_slot
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_slot.is_none()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        match self.current_slot {
            Some(slot) => GameState::Active { slot },
            None => GameState::Complete,
        }
    }

    /// Move the pointer from `from` to `next`, completing the game when `next` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `GameStateError::AlreadyComplete` for a finished game and
    /// `GameStateError::NotCurrentSlot` when `from` is stale.
    pub fn advance(
        &mut self,
        from: GameQuestionId,
        next: Option<GameQuestionId>,
        at: DateTime<Utc>,
    ) -> Result<GameState, GameStateError> {
        match self.current_slot {
            None => return Err(GameStateError::AlreadyComplete),
            Some(current) if current != from => {
                return Err(GameStateError::NotCurrentSlot(from));
            }
            Some(_) => {}
        }

        self.current_slot = next;
        if next.is_none() {
            self.completed_at = Some(at);
        }
        Ok(self.state())
    }
}

//
// ─── SLOTS ─────────────────────────────────────────────────────────────────────
//

/// One question placed at a fixed position within a game's play order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameQuestion {
    id: GameQuestionId,
    game_id: GameId,
    question_id: QuestionId,
    order: u32,
    selected_option: Option<OptionId>,
    answered_at: Option<DateTime<Utc>>,
}

impl GameQuestion {
    #[must_use]
    pub fn new(id: GameQuestionId, game_id: GameId, question_id: QuestionId, order: u32) -> Self {
        Self {
            id,
            game_id,
            question_id,
            order,
            selected_option: None,
            answered_at: None,
        }
    }

    #[must_use]
    pub fn from_persisted(
        id: GameQuestionId,
        game_id: GameId,
        question_id: QuestionId,
        order: u32,
        selected_option: Option<OptionId>,
        answered_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            game_id,
            question_id,
            order,
            selected_option,
            answered_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> GameQuestionId {
        self.id
    }

    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    /// 1-based position in the play order.
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// The chosen option. `None` before answering, or after the option was
    /// deleted by content management.
    #[must_use]
    pub fn selected_option(&self) -> Option<OptionId> {
        self.selected_option
    }

    #[must_use]
    pub fn answered_at(&self) -> Option<DateTime<Utc>> {
        self.answered_at
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered_at.is_some()
    }

    /// Record the player's choice for this slot.
    ///
    /// # Errors
    ///
    /// Returns `GameStateError::SlotAlreadyAnswered` if the slot was answered before.
    pub fn record_answer(
        &mut self,
        option: OptionId,
        at: DateTime<Utc>,
    ) -> Result<(), GameStateError> {
        if self.is_answered() {
            return Err(GameStateError::SlotAlreadyAnswered(self.id));
        }
        self.selected_option = Some(option);
        self.answered_at = Some(at);
        Ok(())
    }

    /// Drop the back-reference to a deleted option, keeping the slot answered.
    pub fn clear_selected_option(&mut self, option: OptionId) {
        if self.selected_option == Some(option) {
            self.selected_option = None;
        }
    }
}

/// Returns the slot that follows `current` in play order.
#[must_use]
pub fn next_slot<'a>(slots: &'a [GameQuestion], current: &GameQuestion) -> Option<&'a GameQuestion> {
    slots
        .iter()
        .find(|s| s.game_id() == current.game_id() && s.order() == current.order() + 1)
}

/// Check that slot orders are exactly `1..=slots.len()`.
///
/// # Errors
///
/// Returns `GameStateError::InvalidOrders` on gaps or duplicates.
pub fn validate_orders(slots: &[GameQuestion]) -> Result<(), GameStateError> {
    let mut orders: Vec<u32> = slots.iter().map(GameQuestion::order).collect();
    orders.sort_unstable();
    let contiguous = orders
        .iter()
        .enumerate()
        .all(|(index, order)| usize::try_from(*order).ok() == Some(index + 1));
    if contiguous {
        Ok(())
    } else {
        Err(GameStateError::InvalidOrders {
            expected_last: slots.len(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
