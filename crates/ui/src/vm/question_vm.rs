use quiz_core::model::{DEFAULT_TIME_LIMIT_MS, OptionDraft, OptionId, QuestionDraft, QuestionId, TopicId};
use services::{QuestionDetail, QuestionListItem};

use super::time_fmt::format_secs;

/// The question form always shows this many option rows; blank ones are skipped.
pub const FORM_OPTION_ROWS: usize = 4;

/// One row of the question table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: QuestionId,
    pub statement: String,
    pub topic_name: String,
    pub time_label: String,
}

impl From<&QuestionListItem> for QuestionRowVm {
    fn from(item: &QuestionListItem) -> Self {
        Self {
            id: item.question.id(),
            statement: item.question.statement().to_owned(),
            topic_name: item.topic_name.clone(),
            time_label: format_secs(item.question.time_limit_secs()),
        }
    }
}

#[must_use]
pub fn map_question_rows(items: &[QuestionListItem]) -> Vec<QuestionRowVm> {
    items.iter().map(QuestionRowVm::from).collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionFormRow {
    pub id: Option<OptionId>,
    pub text: String,
    pub is_correct: bool,
}

impl OptionFormRow {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionFormError {
    MissingTopic,
    InvalidTime,
}

impl QuestionFormError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingTopic => "Pick a topic for this question.",
            Self::InvalidTime => "Time must be a whole number of seconds greater than zero.",
        }
    }
}

/// Editable state of the question form. Time is entered in seconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionFormVm {
    pub topic_id: Option<TopicId>,
    pub statement: String,
    pub time_secs: String,
    pub explanation: String,
    pub options: Vec<OptionFormRow>,
}

impl Default for QuestionFormVm {
    fn default() -> Self {
        Self {
            topic_id: None,
            statement: String::new(),
            time_secs: (DEFAULT_TIME_LIMIT_MS / 1000).to_string(),
            explanation: String::new(),
            options: vec![OptionFormRow::default(); FORM_OPTION_ROWS],
        }
    }
}

impl QuestionFormVm {
    #[must_use]
    pub fn from_detail(detail: &QuestionDetail) -> Self {
        let question = &detail.question;
        let mut options: Vec<OptionFormRow> = detail
            .options
            .iter()
            .map(|option| OptionFormRow {
                id: Some(option.id()),
                text: option.text().to_owned(),
                is_correct: option.is_correct(),
            })
            .collect();
        options.resize(FORM_OPTION_ROWS.max(options.len()), OptionFormRow::default());

        Self {
            topic_id: Some(question.topic_id()),
            statement: question.statement().to_owned(),
            time_secs: question.time_limit_secs().to_string(),
            explanation: question.explanation().unwrap_or_default().to_owned(),
            options,
        }
    }

    /// Build a draft from the filled rows. Content rules are checked later by
    /// `QuestionDraft::validate`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionFormError` when no topic is picked or the time is not a
    /// positive whole number.
    pub fn to_draft(&self) -> Result<QuestionDraft, QuestionFormError> {
        let topic_id = self.topic_id.ok_or(QuestionFormError::MissingTopic)?;
        let secs = self
            .time_secs
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(QuestionFormError::InvalidTime)?;

        let mut draft = QuestionDraft::new(topic_id, self.statement.clone())
            .with_time_limit_ms(secs.saturating_mul(1000));
        if !self.explanation.trim().is_empty() {
            draft = draft.with_explanation(self.explanation.clone());
        }
        draft.options = self
            .options
            .iter()
            .filter(|row| !row.is_blank())
            .map(|row| {
                let option = OptionDraft::new(row.text.clone(), row.is_correct);
                match row.id {
                    Some(id) => option.with_id(id),
                    None => option,
                }
            })
            .collect();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, Question};
    use quiz_core::time::fixed_now;

    fn detail() -> QuestionDetail {
        let question = Question::from_persisted(
            QuestionId::new(9),
            TopicId::new(2),
            "Capital of Spain?".to_string(),
            30_000,
            Some("Madrid since 1561".to_string()),
            fixed_now(),
        );
        let options = vec![
            AnswerOption::from_persisted(OptionId::new(1), QuestionId::new(9), "Madrid".into(), true, 1),
            AnswerOption::from_persisted(OptionId::new(2), QuestionId::new(9), "Lisbon".into(), false, 2),
        ];
        QuestionDetail {
            question,
            topic_name: "Capitals".to_string(),
            options,
        }
    }

    #[test]
    fn default_form_has_four_blank_rows_and_default_time() {
        let form = QuestionFormVm::default();
        assert_eq!(form.options.len(), FORM_OPTION_ROWS);
        assert_eq!(form.time_secs, "45");
        assert_eq!(form.topic_id, None);
    }

    #[test]
    fn form_from_detail_pads_rows_and_keeps_ids() {
        let form = QuestionFormVm::from_detail(&detail());
        assert_eq!(form.options.len(), FORM_OPTION_ROWS);
        assert_eq!(form.options[0].id, Some(OptionId::new(1)));
        assert!(form.options[0].is_correct);
        assert_eq!(form.options[2], OptionFormRow::default());
        assert_eq!(form.time_secs, "30");
        assert_eq!(form.explanation, "Madrid since 1561");
    }

    #[test]
    fn to_draft_skips_blank_rows_and_converts_seconds() {
        let mut form = QuestionFormVm::from_detail(&detail());
        form.options[2].text = "Rome".to_string();
        let draft = form.to_draft().unwrap();

        assert_eq!(draft.topic_id, TopicId::new(2));
        assert_eq!(draft.time_limit_ms, 30_000);
        assert_eq!(draft.options.len(), 3);
        assert_eq!(draft.options[0].id, Some(OptionId::new(1)));
        assert_eq!(draft.options[2].id, None);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn to_draft_rejects_missing_topic_and_bad_time() {
        let form = QuestionFormVm::default();
        assert_eq!(form.to_draft().unwrap_err(), QuestionFormError::MissingTopic);

        let mut form = QuestionFormVm {
            topic_id: Some(TopicId::new(1)),
            ..QuestionFormVm::default()
        };
        form.time_secs = "0".to_string();
        assert_eq!(form.to_draft().unwrap_err(), QuestionFormError::InvalidTime);
        form.time_secs = "abc".to_string();
        assert_eq!(form.to_draft().unwrap_err(), QuestionFormError::InvalidTime);
    }

    #[test]
    fn question_row_shows_time_in_seconds() {
        let detail = detail();
        let item = QuestionListItem {
            question: detail.question,
            topic_name: detail.topic_name,
        };
        let rows = map_question_rows(&[item]);
        assert_eq!(rows[0].time_label, "30s");
        assert_eq!(rows[0].topic_name, "Capitals");
    }
}
