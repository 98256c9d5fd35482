use std::sync::Arc;

use quiz_core::model::{Topic, TopicId};
use storage::repository::{NewTopicRecord, TopicRepository};

use crate::Clock;
use crate::error::TopicServiceError;

/// Topic CRUD.
#[derive(Clone)]
pub struct TopicService {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
}

impl TopicService {
    #[must_use]
    pub fn new(clock: Clock, topics: Arc<dyn TopicRepository>) -> Self {
        Self { clock, topics }
    }

    /// Validate and persist a new topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Topic` for validation failures.
    /// Returns `TopicServiceError::Storage` if persistence fails.
    pub async fn create_topic(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Topic, TopicServiceError> {
        let now = self.clock.now();
        // Validate before touching storage; the backend assigns the real id.
        let draft = Topic::new(TopicId::new(0), name, description, now)?;
        let topic = self
            .topics
            .insert_topic(NewTopicRecord {
                name: draft.name().to_owned(),
                description: draft.description().to_owned(),
                created_at: now,
            })
            .await?;
        tracing::info!(topic = %topic.id(), name = topic.name(), "topic created");
        Ok(topic)
    }

    /// Rename or re-describe a topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::NotFound` if the topic does not exist.
    /// Returns `TopicServiceError::Topic` for validation failures.
    pub async fn update_topic(
        &self,
        id: TopicId,
        name: &str,
        description: &str,
    ) -> Result<Topic, TopicServiceError> {
        let existing = self
            .topics
            .get_topic(id)
            .await?
            .ok_or(TopicServiceError::NotFound)?;
        let updated = Topic::new(id, name, description, existing.created_at())?;
        self.topics.update_topic(&updated).await?;
        Ok(updated)
    }

    /// Fetch a topic by id. Returns `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` if repository access fails.
    pub async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, TopicServiceError> {
        Ok(self.topics.get_topic(id).await?)
    }

    /// List topics ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` if repository access fails.
    pub async fn list_topics(&self) -> Result<Vec<Topic>, TopicServiceError> {
        Ok(self.topics.list_topics().await?)
    }

    /// Delete a topic that no question references.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::InUse` while questions reference the topic.
    /// Returns `TopicServiceError::NotFound` if it does not exist.
    pub async fn delete_topic(&self, id: TopicId) -> Result<(), TopicServiceError> {
        self.topics.delete_topic(id).await?;
        tracing::info!(topic = %id, "topic deleted");
        Ok(())
    }
}
