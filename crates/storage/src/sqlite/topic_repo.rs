use quiz_core::model::{Topic, TopicId};

use super::SqliteRepository;
use super::mapping::{conn, delete_err, map_topic_row, to_i64, topic_id_from_i64};
use crate::repository::{NewTopicRecord, StorageError, TopicRepository};

#[async_trait::async_trait]
impl TopicRepository for SqliteRepository {
    async fn insert_topic(&self, topic: NewTopicRecord) -> Result<Topic, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO topics (name, description, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(&topic.name)
        .bind(&topic.description)
        .bind(topic.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = topic_id_from_i64(res.last_insert_rowid())?;
        Topic::new(id, topic.name, topic.description, topic.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn update_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE topics SET name = ?1, description = ?2
            WHERE id = ?3
            ",
        )
        .bind(topic.name())
        .bind(topic.description())
        .bind(to_i64("topic_id", topic.id().value())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM topics WHERE id = ?1
            ",
        )
        .bind(to_i64("topic_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_topic_row).transpose()
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM topics
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_topic_row).collect()
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM topics WHERE id = ?1")
            .bind(to_i64("topic_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(delete_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
