use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, TopicId};

/// Time limit applied when an author does not pick one (45 seconds).
pub const DEFAULT_TIME_LIMIT_MS: u64 = 45_000;
pub const STATEMENT_MAX_LEN: usize = 200;
pub const OPTION_TEXT_MAX_LEN: usize = 100;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question statement cannot be empty")]
    EmptyStatement,

    #[error("question statement must be at most {max} characters (got {len})")]
    StatementTooLong { len: usize, max: usize },

    #[error("time limit must be > 0")]
    InvalidTimeLimit,

    #[error("a question needs between {min} and {max} options (got {count})")]
    OptionCount { count: usize, min: usize, max: usize },

    #[error("option {position} text cannot be empty")]
    EmptyOptionText { position: usize },

    #[error("option {position} text must be at most {max} characters (got {len})")]
    OptionTextTooLong {
        position: usize,
        len: usize,
        max: usize,
    },

    #[error("at least one option must be marked correct")]
    NoCorrectOption,

    #[error("option {0:?} is listed twice")]
    DuplicateOptionId(OptionId),
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Author input for one answer option.
///
/// `id` is set when editing an option that already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub id: Option<OptionId>,
    pub text: String,
    pub is_correct: bool,
}

impl OptionDraft {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: None,
            text: text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: OptionId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Author input for a question and its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub topic_id: TopicId,
    pub statement: String,
    pub time_limit_ms: u64,
    pub explanation: Option<String>,
    pub options: Vec<OptionDraft>,
}

impl QuestionDraft {
    /// Starts a draft with the default time limit and no options.
    #[must_use]
    pub fn new(topic_id: TopicId, statement: impl Into<String>) -> Self {
        Self {
            topic_id,
            statement: statement.into(),
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            explanation: None,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, text: impl Into<String>, is_correct: bool) -> Self {
        self.options.push(OptionDraft::new(text, is_correct));
        self
    }

    #[must_use]
    pub fn with_time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Validate the draft: statement and option texts are trimmed, blank
    /// explanations are dropped and options get positions `1..=n` in input order.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let statement = self.statement.trim();
        if statement.is_empty() {
            return Err(QuestionError::EmptyStatement);
        }
        let len = statement.chars().count();
        if len > STATEMENT_MAX_LEN {
            return Err(QuestionError::StatementTooLong {
                len,
                max: STATEMENT_MAX_LEN,
            });
        }
        if self.time_limit_ms == 0 {
            return Err(QuestionError::InvalidTimeLimit);
        }

        let count = self.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
            return Err(QuestionError::OptionCount {
                count,
                min: MIN_OPTIONS,
                max: MAX_OPTIONS,
            });
        }

        let mut options = Vec::with_capacity(count);
        for (index, draft) in self.options.into_iter().enumerate() {
            let position = index + 1;
            let text = draft.text.trim();
            if text.is_empty() {
                return Err(QuestionError::EmptyOptionText { position });
            }
            let len = text.chars().count();
            if len > OPTION_TEXT_MAX_LEN {
                return Err(QuestionError::OptionTextTooLong {
                    position,
                    len,
                    max: OPTION_TEXT_MAX_LEN,
                });
            }
            if let Some(id) = draft.id {
                if options.iter().any(|o: &ValidatedOption| o.id == Some(id)) {
                    return Err(QuestionError::DuplicateOptionId(id));
                }
            }
            options.push(ValidatedOption {
                id: draft.id,
                text: text.to_owned(),
                is_correct: draft.is_correct,
                // Bounded by MAX_OPTIONS.
                position: position as u8,
            });
        }

        if !options.iter().any(|o| o.is_correct) {
            return Err(QuestionError::NoCorrectOption);
        }

        let explanation = self
            .explanation
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(ValidatedQuestion {
            topic_id: self.topic_id,
            statement: statement.to_owned(),
            time_limit_ms: self.time_limit_ms,
            explanation,
            options,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOption {
    pub id: Option<OptionId>,
    pub text: String,
    pub is_correct: bool,
    pub position: u8,
}

/// A question draft that passed validation and is ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub topic_id: TopicId,
    pub statement: String,
    pub time_limit_ms: u64,
    pub explanation: Option<String>,
    pub options: Vec<ValidatedOption>,
}

//
// ─── PERSISTED TYPES ───────────────────────────────────────────────────────────
//

/// A single prompt belonging to exactly one topic.
///
/// Options are stored and fetched separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    topic_id: TopicId,
    statement: String,
    time_limit_ms: u64,
    explanation: Option<String>,
    created_at: DateTime<Utc>,
}

impl Question {
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        topic_id: TopicId,
        statement: String,
        time_limit_ms: u64,
        explanation: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            topic_id,
            statement,
            time_limit_ms,
            explanation,
            created_at,
        }
    }

    #[must_use]
    pub fn from_validated(
        id: QuestionId,
        validated: &ValidatedQuestion,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::from_persisted(
            id,
            validated.topic_id,
            validated.statement.clone(),
            validated.time_limit_ms,
            validated.explanation.clone(),
            created_at,
        )
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub fn time_limit_ms(&self) -> u64 {
        self.time_limit_ms
    }

    /// Time limit rounded down to whole seconds.
    #[must_use]
    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_ms / 1000
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One answer choice of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    id: OptionId,
    question_id: QuestionId,
    text: String,
    is_correct: bool,
    position: u8,
}

impl AnswerOption {
    #[must_use]
    pub fn from_persisted(
        id: OptionId,
        question_id: QuestionId,
        text: String,
        is_correct: bool,
        position: u8,
    ) -> Self {
        Self {
            id,
            question_id,
            text,
            is_correct,
            position,
        }
    }

    #[must_use]
    pub fn id(&self) -> OptionId {
        self.id
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// 1-based display position within the question.
    #[must_use]
    pub fn position(&self) -> u8 {
        self.position
    }
}

/// Returns the first option marked correct, if any.
#[must_use]
pub fn correct_option(options: &[AnswerOption]) -> Option<&AnswerOption> {
    options.iter().find(|o| o.is_correct())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft::new(TopicId::new(1), "Capital of France?")
            .with_option("Berlin", false)
            .with_option("Paris", true)
    }

    #[test]
    fn valid_draft_assigns_positions_and_defaults() {
        let validated = draft().validate().unwrap();

        assert_eq!(validated.statement, "Capital of France?");
        assert_eq!(validated.time_limit_ms, DEFAULT_TIME_LIMIT_MS);
        assert_eq!(validated.explanation, None);
        let positions: Vec<u8> = validated.options.iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(validated.options[1].is_correct);
    }

    #[test]
    fn draft_rejects_blank_statement() {
        let mut d = draft();
        d.statement = "  ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyStatement);
    }

    #[test]
    fn draft_rejects_long_statement() {
        let mut d = draft();
        d.statement = "q".repeat(STATEMENT_MAX_LEN + 1);
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::StatementTooLong { .. }
        ));
    }

    #[test]
    fn draft_rejects_zero_time_limit() {
        let err = draft().with_time_limit_ms(0).validate().unwrap_err();
        assert_eq!(err, QuestionError::InvalidTimeLimit);
    }

    #[test]
    fn draft_requires_two_to_four_options() {
        let one = QuestionDraft::new(TopicId::new(1), "Q").with_option("A", true);
        assert!(matches!(
            one.validate().unwrap_err(),
            QuestionError::OptionCount { count: 1, .. }
        ));

        let five = QuestionDraft::new(TopicId::new(1), "Q")
            .with_option("A", true)
            .with_option("B", false)
            .with_option("C", false)
            .with_option("D", false)
            .with_option("E", false);
        assert!(matches!(
            five.validate().unwrap_err(),
            QuestionError::OptionCount { count: 5, .. }
        ));
    }

    #[test]
    fn draft_requires_a_correct_option() {
        let d = QuestionDraft::new(TopicId::new(1), "Q")
            .with_option("A", false)
            .with_option("B", false);
        assert_eq!(d.validate().unwrap_err(), QuestionError::NoCorrectOption);
    }

    #[test]
    fn draft_rejects_blank_option_text() {
        let d = QuestionDraft::new(TopicId::new(1), "Q")
            .with_option("A", true)
            .with_option("   ", false);
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::EmptyOptionText { position: 2 }
        );
    }

    #[test]
    fn draft_rejects_duplicate_option_ids() {
        let mut d = draft();
        d.options[0].id = Some(OptionId::new(7));
        d.options[1].id = Some(OptionId::new(7));
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::DuplicateOptionId(OptionId::new(7))
        );
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let validated = draft().with_explanation("   ").validate().unwrap();
        assert_eq!(validated.explanation, None);

        let validated = draft().with_explanation(" Paris is on the Seine ").validate().unwrap();
        assert_eq!(validated.explanation.as_deref(), Some("Paris is on the Seine"));
    }

    #[test]
    fn correct_option_picks_first_marked() {
        let q = QuestionId::new(1);
        let options = vec![
            AnswerOption::from_persisted(OptionId::new(1), q, "A".into(), false, 1),
            AnswerOption::from_persisted(OptionId::new(2), q, "B".into(), true, 2),
            AnswerOption::from_persisted(OptionId::new(3), q, "C".into(), true, 3),
        ];
        assert_eq!(correct_option(&options).map(AnswerOption::id), Some(OptionId::new(2)));
    }

    #[test]
    fn time_limit_secs_rounds_down() {
        let question = Question::from_persisted(
            QuestionId::new(1),
            TopicId::new(1),
            "Q".into(),
            45_500,
            None,
            crate::time::fixed_now(),
        );
        assert_eq!(question.time_limit_secs(), 45);
    }
}
