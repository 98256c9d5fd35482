use chrono::{DateTime, Utc};
use quiz_core::model::{
    Game, GameId, GameQuestion, GameQuestionId, GameToken, OptionId, validate_orders,
};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_game_row, map_slot_row, ser, to_i64, write_err};
use crate::repository::{GameListRecord, GameRepository, NewGameRecord, StorageError};

impl SqliteRepository {
    async fn fetch_game(&self, game_id: i64) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, token, topic_id, is_complete, current_slot_id, created_at, completed_at
            FROM games WHERE id = ?1
            ",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_game_row).transpose()
    }
}

#[async_trait::async_trait]
impl GameRepository for SqliteRepository {
    async fn create_game(&self, game: NewGameRecord) -> Result<Game, StorageError> {
        if game.question_ids.is_empty() {
            return Err(StorageError::Conflict);
        }

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
            INSERT INTO games (token, topic_id, is_complete, current_slot_id, created_at)
            VALUES (?1, ?2, 0, NULL, ?3)
            ",
        )
        .bind(game.token.as_uuid())
        .bind(to_i64("topic_id", game.topic_id.value())?)
        .bind(game.created_at)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;
        let game_id = res.last_insert_rowid();

        let mut first_slot = None;
        for (index, question_id) in game.question_ids.iter().enumerate() {
            let position = i64::try_from(index + 1)
                .map_err(|_| StorageError::Serialization("slot order overflow".into()))?;
            let res = sqlx::query(
                r"
                INSERT INTO game_questions (game_id, question_id, position)
                VALUES (?1, ?2, ?3)
                ",
            )
            .bind(game_id)
            .bind(to_i64("question_id", question_id.value())?)
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
            first_slot.get_or_insert(res.last_insert_rowid());
        }

        sqlx::query("UPDATE games SET current_slot_id = ?1 WHERE id = ?2")
            .bind(first_slot)
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;

        self.fetch_game(game_id).await?.ok_or(StorageError::NotFound)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StorageError> {
        self.fetch_game(to_i64("game_id", id.value())?).await
    }

    async fn get_game_by_token(&self, token: GameToken) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, token, topic_id, is_complete, current_slot_id, created_at, completed_at
            FROM games WHERE token = ?1
            ",
        )
        .bind(token.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_game_row).transpose()
    }

    async fn list_games(&self, limit: u32) -> Result<Vec<GameListRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT g.id, g.token, g.topic_id, g.is_complete, g.current_slot_id,
                   g.created_at, g.completed_at,
                   t.name AS topic_name,
                   (SELECT COUNT(*) FROM game_questions s
                     WHERE s.game_id = g.id) AS total,
                   (SELECT COUNT(*) FROM game_questions s
                     WHERE s.game_id = g.id AND s.answered_at IS NOT NULL) AS answered
            FROM games g
            JOIN topics t ON t.id = g.topic_id
            ORDER BY g.created_at DESC, g.id DESC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let total: i64 = row.try_get("total").map_err(ser)?;
            let answered: i64 = row.try_get("answered").map_err(ser)?;
            records.push(GameListRecord {
                game: map_game_row(&row)?,
                topic_name: row.try_get("topic_name").map_err(ser)?,
                answered: u32::try_from(answered).map_err(ser)?,
                total: u32::try_from(total).map_err(ser)?,
            });
        }
        Ok(records)
    }

    async fn get_slots(&self, game: GameId) -> Result<Vec<GameQuestion>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, game_id, question_id, position, selected_option_id, answered_at
            FROM game_questions
            WHERE game_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(to_i64("game_id", game.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let slots = rows
            .iter()
            .map(map_slot_row)
            .collect::<Result<Vec<_>, _>>()?;
        validate_orders(&slots).map_err(ser)?;
        Ok(slots)
    }

    async fn record_answer(
        &self,
        game: GameId,
        slot: GameQuestionId,
        option: OptionId,
        answered_at: DateTime<Utc>,
    ) -> Result<Game, StorageError> {
        let game_id = to_i64("game_id", game.value())?;
        let slot_id = to_i64("slot_id", slot.value())?;
        let mut tx = self.begin_write().await?;

        let position: Option<i64> = sqlx::query_scalar(
            "SELECT position FROM game_questions WHERE id = ?1 AND game_id = ?2",
        )
        .bind(slot_id)
        .bind(game_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;
        let Some(position) = position else {
            return Err(StorageError::Conflict);
        };

        let next: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM game_questions WHERE game_id = ?1 AND position = ?2",
        )
        .bind(game_id)
        .bind(position + 1)
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;
        let completed_at = next.is_none().then_some(answered_at);

        let advanced = sqlx::query(
            r"
            UPDATE games
            SET current_slot_id = ?1, is_complete = ?2, completed_at = ?3
            WHERE id = ?4 AND current_slot_id = ?5 AND is_complete = 0
            ",
        )
        .bind(next)
        .bind(i64::from(next.is_none()))
        .bind(completed_at)
        .bind(game_id)
        .bind(slot_id)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if advanced.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM games WHERE id = ?1")
                .bind(game_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(conn)?;
            return Err(if exists.is_some() {
                StorageError::Conflict
            } else {
                StorageError::NotFound
            });
        }

        let answered = sqlx::query(
            r"
            UPDATE game_questions
            SET selected_option_id = ?1, answered_at = ?2
            WHERE id = ?3 AND answered_at IS NULL
            ",
        )
        .bind(to_i64("option_id", option.value())?)
        .bind(answered_at)
        .bind(slot_id)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;
        if answered.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        tx.commit().await.map_err(conn)?;

        self.fetch_game(game_id).await?.ok_or(StorageError::NotFound)
    }

    async fn delete_game(&self, id: GameId) -> Result<(), StorageError> {
        let game_id = to_i64("game_id", id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // Break the games <-> game_questions cycle before the cascade runs.
        sqlx::query("UPDATE games SET current_slot_id = NULL WHERE id = ?1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        let res = sqlx::query("DELETE FROM games WHERE id = ?1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
