use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use quiz_core::model::{
    AnswerOption, Question, QuestionDraft, QuestionId, TopicId, ValidatedQuestion,
};
use storage::repository::{QuestionRepository, TopicRepository};

use crate::Clock;
use crate::error::{ImportError, QuestionServiceError};
use crate::import::{self, ImportReport, SheetFormat};

/// A question with its options and topic name, for editing forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDetail {
    pub question: Question,
    pub topic_name: String,
    pub options: Vec<AnswerOption>,
}

/// Presentation-agnostic row of the question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionListItem {
    pub question: Question,
    pub topic_name: String,
}

/// Question and option CRUD plus spreadsheet import.
#[derive(Clone)]
pub struct QuestionService {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clock,
            topics,
            questions,
        }
    }

    /// Validate a draft and store the question with its options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` for validation failures.
    /// Returns `QuestionServiceError::TopicNotFound` for an unknown topic.
    pub async fn create_question(
        &self,
        draft: QuestionDraft,
    ) -> Result<QuestionId, QuestionServiceError> {
        let validated = draft.validate()?;
        if self.topics.get_topic(validated.topic_id).await?.is_none() {
            return Err(QuestionServiceError::TopicNotFound);
        }
        let id = self
            .questions
            .insert_question(&validated, self.clock.now())
            .await?;
        tracing::info!(question = %id, topic = %validated.topic_id, "question created");
        Ok(id)
    }

    /// Replace a question and reconcile its options.
    ///
    /// Drafted options carrying an id update that option; options without one
    /// are added; stored options left out of the draft are removed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` for validation failures.
    /// Returns `QuestionServiceError::TopicNotFound` for an unknown topic.
    /// Returns `QuestionServiceError::NotFound` if the question or an option id is unknown.
    pub async fn update_question(
        &self,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<(), QuestionServiceError> {
        let validated = draft.validate()?;
        if self.topics.get_topic(validated.topic_id).await?.is_none() {
            return Err(QuestionServiceError::TopicNotFound);
        }
        self.questions.update_question(id, &validated).await?;
        tracing::info!(question = %id, "question updated");
        Ok(())
    }

    /// Fetch a question with its options. Returns `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn get_question(
        &self,
        id: QuestionId,
    ) -> Result<Option<QuestionDetail>, QuestionServiceError> {
        let Some(question) = self.questions.get_question(id).await? else {
            return Ok(None);
        };
        let topic_name = self
            .topics
            .get_topic(question.topic_id())
            .await?
            .map(|t| t.name().to_owned())
            .unwrap_or_default();
        let options = self.questions.get_options(id).await?;
        Ok(Some(QuestionDetail {
            question,
            topic_name,
            options,
        }))
    }

    /// List questions with their topic names, optionally for one topic.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn list_questions(
        &self,
        topic: Option<TopicId>,
    ) -> Result<Vec<QuestionListItem>, QuestionServiceError> {
        let names: HashMap<TopicId, String> = self
            .topics
            .list_topics()
            .await?
            .into_iter()
            .map(|t| (t.id(), t.name().to_owned()))
            .collect();
        let questions = self.questions.list_questions(topic).await?;
        Ok(questions
            .into_iter()
            .map(|question| QuestionListItem {
                topic_name: names
                    .get(&question.topic_id())
                    .cloned()
                    .unwrap_or_default(),
                question,
            })
            .collect())
    }

    /// Number of questions a topic holds.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn count_questions(&self, topic: TopicId) -> Result<usize, QuestionServiceError> {
        Ok(self.questions.list_question_ids(topic).await?.len())
    }

    /// Delete a question and its options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::InUse` while a game references the question.
    /// Returns `QuestionServiceError::NotFound` if it does not exist.
    pub async fn delete_question(&self, id: QuestionId) -> Result<(), QuestionServiceError> {
        self.questions.delete_question(id).await?;
        tracing::info!(question = %id, "question deleted");
        Ok(())
    }

    /// Import every row of a CSV sheet into `topic`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` naming the first bad row, or for an empty sheet,
    /// an unknown topic, or a storage failure. Nothing is stored on error.
    pub async fn import_csv<R: Read>(
        &self,
        topic: TopicId,
        reader: R,
    ) -> Result<ImportReport, ImportError> {
        self.ensure_topic(topic).await?;
        let questions = import::parse_questions(topic, reader)?;
        self.store_imported(topic, &questions).await
    }

    /// Import a CSV file or the first worksheet of a workbook from disk.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::UnsupportedFormat` for other file types,
    /// `ImportError::Io` / `ImportError::Workbook` if the file cannot be read,
    /// otherwise as `import_csv`.
    pub async fn import_file(
        &self,
        topic: TopicId,
        path: &Path,
    ) -> Result<ImportReport, ImportError> {
        let format = SheetFormat::from_path(path)?;
        self.ensure_topic(topic).await?;
        let questions = match format {
            SheetFormat::Csv => import::parse_questions(topic, std::fs::File::open(path)?)?,
            SheetFormat::Workbook => import::parse_workbook(topic, path)?,
        };
        self.store_imported(topic, &questions).await
    }

    async fn ensure_topic(&self, topic: TopicId) -> Result<(), ImportError> {
        match self.topics.get_topic(topic).await? {
            Some(_) => Ok(()),
            None => Err(ImportError::TopicNotFound),
        }
    }

    async fn store_imported(
        &self,
        topic: TopicId,
        questions: &[ValidatedQuestion],
    ) -> Result<ImportReport, ImportError> {
        let question_ids = self
            .questions
            .insert_questions(questions, self.clock.now())
            .await?;
        tracing::info!(topic = %topic, imported = question_ids.len(), "import finished");
        Ok(ImportReport {
            topic_id: topic,
            question_ids,
        })
    }
}
