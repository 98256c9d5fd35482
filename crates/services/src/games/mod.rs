mod engine;
mod sampling;
mod view;

// Public API of the game subsystem.
pub use crate::error::GameError;
pub use engine::GameEngine;
pub use sampling::{QuestionSampler, RandomSampler, SeededSampler};
pub use view::{GameAnswerResult, GameListItem, PlaySlot};
