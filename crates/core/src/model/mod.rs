mod game;
mod ids;
mod question;
mod topic;

pub use ids::{GameId, GameQuestionId, GameToken, OptionId, ParseIdError, QuestionId, TopicId};

pub use game::{GameQuestion, GameState, GameStateError, Game, next_slot, validate_orders};
pub use question::{
    AnswerOption, DEFAULT_TIME_LIMIT_MS, MAX_OPTIONS, MIN_OPTIONS, OPTION_TEXT_MAX_LEN,
    OptionDraft, Question, QuestionDraft, QuestionError, STATEMENT_MAX_LEN, ValidatedOption,
    ValidatedQuestion, correct_option,
};
pub use topic::{TOPIC_NAME_MAX_LEN, Topic, TopicError, validate_name};
