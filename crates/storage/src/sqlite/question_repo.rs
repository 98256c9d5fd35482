use std::collections::HashSet;

use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerOption, Question, QuestionId, TopicId, ValidatedQuestion};
use sqlx::{Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{
    conn, delete_err, map_option_row, map_question_row, question_id_from_i64, to_i64,
    write_err,
};
use crate::repository::{QuestionRepository, StorageError};

async fn insert_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    question: &ValidatedQuestion,
    created_at: DateTime<Utc>,
) -> Result<QuestionId, StorageError> {
    let res = sqlx::query(
        r"
        INSERT INTO questions (topic_id, statement, time_limit_ms, explanation, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
    )
    .bind(to_i64("topic_id", question.topic_id.value())?)
    .bind(&question.statement)
    .bind(to_i64("time_limit_ms", question.time_limit_ms)?)
    .bind(question.explanation.as_deref())
    .bind(created_at)
    .execute(&mut **tx)
    .await
    .map_err(write_err)?;
    let question_id = res.last_insert_rowid();

    for option in &question.options {
        sqlx::query(
            r"
            INSERT INTO options (question_id, text, is_correct, position)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(question_id)
        .bind(&option.text)
        .bind(i64::from(option.is_correct))
        .bind(i64::from(option.position))
        .execute(&mut **tx)
        .await
        .map_err(write_err)?;
    }

    question_id_from_i64(question_id)
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
        created_at: DateTime<Utc>,
    ) -> Result<QuestionId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let id = insert_in_tx(&mut tx, question, created_at).await?;
        tx.commit().await.map_err(conn)?;
        Ok(id)
    }

    async fn insert_questions(
        &self,
        questions: &[ValidatedQuestion],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut ids = Vec::with_capacity(questions.len());
        for question in questions {
            ids.push(insert_in_tx(&mut tx, question, created_at).await?);
        }
        tx.commit().await.map_err(conn)?;
        Ok(ids)
    }

    async fn update_question(
        &self,
        id: QuestionId,
        question: &ValidatedQuestion,
    ) -> Result<(), StorageError> {
        let question_id = to_i64("question_id", id.value())?;
        let mut tx = self.begin_write().await?;

        let res = sqlx::query(
            r"
            UPDATE questions
            SET topic_id = ?1, statement = ?2, time_limit_ms = ?3, explanation = ?4
            WHERE id = ?5
            ",
        )
        .bind(to_i64("topic_id", question.topic_id.value())?)
        .bind(&question.statement)
        .bind(to_i64("time_limit_ms", question.time_limit_ms)?)
        .bind(question.explanation.as_deref())
        .bind(question_id)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let stored: Vec<i64> = sqlx::query_scalar("SELECT id FROM options WHERE question_id = ?1")
            .bind(question_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(conn)?;
        let stored: HashSet<i64> = stored.into_iter().collect();

        let mut kept = HashSet::new();
        for option_id in question.options.iter().filter_map(|o| o.id) {
            let option_id = to_i64("option_id", option_id.value())?;
            if !stored.contains(&option_id) {
                return Err(StorageError::NotFound);
            }
            kept.insert(option_id);
        }

        // Slots that selected a removed option lose the reference (ON DELETE SET NULL).
        for stale in stored.difference(&kept) {
            sqlx::query("DELETE FROM options WHERE id = ?1")
                .bind(*stale)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        for option in &question.options {
            match option.id {
                Some(option_id) => {
                    sqlx::query(
                        r"
                        UPDATE options SET text = ?1, is_correct = ?2, position = ?3
                        WHERE id = ?4
                        ",
                    )
                    .bind(&option.text)
                    .bind(i64::from(option.is_correct))
                    .bind(i64::from(option.position))
                    .bind(to_i64("option_id", option_id.value())?)
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
                }
                None => {
                    sqlx::query(
                        r"
                        INSERT INTO options (question_id, text, is_correct, position)
                        VALUES (?1, ?2, ?3, ?4)
                        ",
                    )
                    .bind(question_id)
                    .bind(&option.text)
                    .bind(i64::from(option.is_correct))
                    .bind(i64::from(option.position))
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
                }
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, topic_id, statement, time_limit_ms, explanation, created_at
            FROM questions WHERE id = ?1
            ",
        )
        .bind(to_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn list_questions(
        &self,
        topic: Option<TopicId>,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = match topic {
            Some(topic) => sqlx::query(
                r"
                SELECT id, topic_id, statement, time_limit_ms, explanation, created_at
                FROM questions WHERE topic_id = ?1
                ORDER BY id ASC
                ",
            )
            .bind(to_i64("topic_id", topic.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?,
            None => sqlx::query(
                r"
                SELECT id, topic_id, statement, time_limit_ms, explanation, created_at
                FROM questions
                ORDER BY id ASC
                ",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?,
        };

        rows.iter().map(map_question_row).collect()
    }

    async fn list_question_ids(&self, topic: TopicId) -> Result<Vec<QuestionId>, StorageError> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM questions WHERE topic_id = ?1 ORDER BY id ASC")
                .bind(to_i64("topic_id", topic.value())?)
                .fetch_all(&self.pool)
                .await
                .map_err(conn)?;

        ids.into_iter().map(question_id_from_i64).collect()
    }

    async fn get_options(&self, question: QuestionId) -> Result<Vec<AnswerOption>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question_id, text, is_correct, position
            FROM options
            WHERE question_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(to_i64("question_id", question.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_option_row).collect()
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(to_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(delete_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
