use std::collections::HashSet;
use std::sync::Arc;

use quiz_core::model::{Game, GameToken, OptionId, TopicId, correct_option};
use storage::repository::{
    GameRepository, NewGameRecord, QuestionRepository, StorageError, TopicRepository,
};

use super::sampling::{QuestionSampler, RandomSampler};
use super::view::{GameAnswerResult, GameListItem, PlaySlot};
use crate::Clock;
use crate::error::GameError;

/// Creates games, serves their current question and advances them on answers.
#[derive(Clone)]
pub struct GameEngine {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    games: Arc<dyn GameRepository>,
    sampler: Arc<dyn QuestionSampler>,
}

impl GameEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
        games: Arc<dyn GameRepository>,
    ) -> Self {
        Self {
            clock,
            topics,
            questions,
            games,
            sampler: Arc::new(RandomSampler),
        }
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: Arc<dyn QuestionSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Start a game over `min(requested_count, available)` random questions of a topic.
    ///
    /// Game and slots are persisted together; nothing is written on failure.
    ///
    /// # Errors
    ///
    /// Returns `GameError::TopicNotFound` for an unknown topic.
    /// Returns `GameError::EmptyPool` if the topic has no questions or `requested_count` is 0.
    /// Returns `GameError::InvalidSample` if the sampler misbehaves.
    /// Returns `GameError::Persistence` if storage fails.
    pub async fn create_game(
        &self,
        topic_id: TopicId,
        requested_count: u32,
    ) -> Result<Game, GameError> {
        if self.topics.get_topic(topic_id).await?.is_none() {
            return Err(GameError::TopicNotFound);
        }

        let pool = self.questions.list_question_ids(topic_id).await?;
        let requested = usize::try_from(requested_count).unwrap_or(usize::MAX);
        if requested == 0 || pool.is_empty() {
            return Err(GameError::EmptyPool);
        }

        let count = requested.min(pool.len());
        let picks = self.sampler.sample(pool.len(), count);
        validate_sample(&picks, pool.len(), count)?;
        let question_ids = picks.into_iter().map(|index| pool[index]).collect();

        let game = self
            .games
            .create_game(NewGameRecord {
                token: GameToken::generate(),
                topic_id,
                created_at: self.clock.now(),
                question_ids,
            })
            .await?;

        tracing::info!(
            game = %game.token(),
            topic = %topic_id,
            questions = count,
            available = pool.len(),
            "game created"
        );
        Ok(game)
    }

    /// Fetch a game by its external token.
    ///
    /// # Errors
    ///
    /// Returns `GameError::GameNotFound` if no game has this token.
    pub async fn get_game(&self, token: GameToken) -> Result<Game, GameError> {
        self.games
            .get_game_by_token(token)
            .await?
            .ok_or(GameError::GameNotFound)
    }

    /// The question the game is waiting on, or `None` once complete.
    ///
    /// # Errors
    ///
    /// Returns `GameError::GameNotFound` for an unknown token and
    /// `GameError::Persistence` if slot or question data is missing.
    pub async fn current_question(&self, token: GameToken) -> Result<Option<PlaySlot>, GameError> {
        let game = self.get_game(token).await?;
        let Some(slot_id) = game.current_slot() else {
            return Ok(None);
        };

        let slots = self.games.get_slots(game.id()).await?;
        let total = u32::try_from(slots.len()).unwrap_or(u32::MAX);
        let slot = slots
            .into_iter()
            .find(|s| s.id() == slot_id)
            .ok_or(StorageError::NotFound)?;
        let question = self
            .questions
            .get_question(slot.question_id())
            .await?
            .ok_or(StorageError::NotFound)?;
        let options = self.questions.get_options(question.id()).await?;

        Ok(Some(PlaySlot {
            game,
            slot,
            question,
            options,
            total,
        }))
    }

    /// Answer the current question and advance the game.
    ///
    /// The advance is conditional on the slot still being current, so a
    /// repeated or concurrent submission for the same slot is rejected
    /// instead of skipping a question.
    ///
    /// # Errors
    ///
    /// Returns `GameError::GameAlreadyComplete` once every slot is answered.
    /// Returns `GameError::InvalidOption` if `option_id` is not an option of
    /// the current question, or the slot was answered concurrently.
    /// Returns `GameError::GameNotFound` / `GameError::Persistence` otherwise.
    pub async fn submit_answer(
        &self,
        token: GameToken,
        option_id: OptionId,
    ) -> Result<GameAnswerResult, GameError> {
        let game = self.get_game(token).await?;
        let Some(slot_id) = game.current_slot() else {
            return Err(GameError::GameAlreadyComplete);
        };

        let mut slot = self
            .games
            .get_slots(game.id())
            .await?
            .into_iter()
            .find(|s| s.id() == slot_id)
            .ok_or(StorageError::NotFound)?;
        let options = self.questions.get_options(slot.question_id()).await?;
        let chosen = options
            .iter()
            .find(|o| o.id() == option_id)
            .ok_or(GameError::InvalidOption)?;

        let answered_at = self.clock.now();
        let updated = match self
            .games
            .record_answer(game.id(), slot_id, option_id, answered_at)
            .await
        {
            Ok(updated) => updated,
            Err(StorageError::Conflict) => return Err(self.stale_submission(token).await),
            Err(err) => return Err(err.into()),
        };
        slot.record_answer(option_id, answered_at)
            .map_err(|_| GameError::InvalidOption)?;

        let explanation = self
            .questions
            .get_question(slot.question_id())
            .await?
            .and_then(|q| q.explanation().map(str::to_owned));

        tracing::info!(
            game = %token,
            order = slot.order(),
            correct = chosen.is_correct(),
            "answer recorded"
        );
        if updated.is_complete() {
            tracing::info!(game = %token, "game completed");
        }

        Ok(GameAnswerResult {
            game: updated,
            slot,
            is_correct: chosen.is_correct(),
            correct_option: correct_option(&options).cloned(),
            explanation,
        })
    }

    /// Most recent games first, with progress.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Persistence` if storage fails.
    pub async fn list_games(&self, limit: u32) -> Result<Vec<GameListItem>, GameError> {
        let records = self.games.list_games(limit).await?;
        Ok(records.iter().map(GameListItem::from_record).collect())
    }

    /// Delete a game and its slots, releasing its questions for deletion.
    ///
    /// # Errors
    ///
    /// Returns `GameError::GameNotFound` for an unknown token.
    pub async fn delete_game(&self, token: GameToken) -> Result<(), GameError> {
        let game = self.get_game(token).await?;
        match self.games.delete_game(game.id()).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => return Err(GameError::GameNotFound),
            Err(err) => return Err(err.into()),
        }
        tracing::info!(game = %token, "game deleted");
        Ok(())
    }

    /// Classify a submission that lost the compare-and-set.
    async fn stale_submission(&self, token: GameToken) -> GameError {
        match self.get_game(token).await {
            Ok(game) if game.is_complete() => GameError::GameAlreadyComplete,
            Ok(_) => GameError::InvalidOption,
            Err(err) => err,
        }
    }
}

fn validate_sample(picks: &[usize], available: usize, count: usize) -> Result<(), GameError> {
    let distinct: HashSet<usize> = picks.iter().copied().collect();
    if picks.len() != count || distinct.len() != count || picks.iter().any(|&i| i >= available) {
        return Err(GameError::InvalidSample);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, QuestionId};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, NewTopicRecord};

    struct FixedSampler(Vec<usize>);

    impl QuestionSampler for FixedSampler {
        fn sample(&self, _available: usize, _count: usize) -> Vec<usize> {
            self.0.clone()
        }
    }

    async fn seeded_topic(repo: &InMemoryRepository, questions: usize) -> (TopicId, Vec<QuestionId>) {
        let topic = repo
            .insert_topic(NewTopicRecord {
                name: "Capitals".into(),
                description: String::new(),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for n in 0..questions {
            let draft = QuestionDraft::new(topic.id(), format!("Question {n}?"))
                .with_option("yes", true)
                .with_option("no", false)
                .validate()
                .unwrap();
            ids.push(repo.insert_question(&draft, fixed_now()).await.unwrap());
        }
        (topic.id(), ids)
    }

    fn engine(repo: &InMemoryRepository, sampler: Arc<dyn QuestionSampler>) -> GameEngine {
        GameEngine::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .with_sampler(sampler)
    }

    #[tokio::test]
    async fn draw_order_becomes_play_order() {
        let repo = InMemoryRepository::new();
        let (topic, ids) = seeded_topic(&repo, 3).await;
        let engine = engine(&repo, Arc::new(FixedSampler(vec![2, 0])));

        let game = engine.create_game(topic, 2).await.unwrap();
        let slots = repo.get_slots(game.id()).await.unwrap();
        let played: Vec<QuestionId> = slots.iter().map(|s| s.question_id()).collect();
        assert_eq!(played, vec![ids[2], ids[0]]);
    }

    #[tokio::test]
    async fn duplicate_sample_is_rejected_without_persisting() {
        let repo = InMemoryRepository::new();
        let (topic, _) = seeded_topic(&repo, 3).await;
        let engine = engine(&repo, Arc::new(FixedSampler(vec![1, 1])));

        let err = engine.create_game(topic, 2).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidSample));
        assert!(engine.list_games(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_sample_is_rejected() {
        let repo = InMemoryRepository::new();
        let (topic, _) = seeded_topic(&repo, 2).await;
        let engine = engine(&repo, Arc::new(FixedSampler(vec![0, 5])));

        let err = engine.create_game(topic, 2).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidSample));
    }

    #[tokio::test]
    async fn zero_requested_is_empty_pool() {
        let repo = InMemoryRepository::new();
        let (topic, _) = seeded_topic(&repo, 2).await;
        let engine = engine(&repo, Arc::new(RandomSampler));

        let err = engine.create_game(topic, 0).await.unwrap_err();
        assert!(matches!(err, GameError::EmptyPool));
    }

    #[tokio::test]
    async fn unknown_topic_is_reported() {
        let repo = InMemoryRepository::new();
        let engine = engine(&repo, Arc::new(RandomSampler));

        let err = engine.create_game(TopicId::new(77), 5).await.unwrap_err();
        assert!(matches!(err, GameError::TopicNotFound));
    }

    #[tokio::test]
    async fn unknown_token_is_game_not_found() {
        let repo = InMemoryRepository::new();
        let engine = engine(&repo, Arc::new(RandomSampler));

        let err = engine
            .submit_answer(GameToken::generate(), OptionId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::GameNotFound));
    }

    #[test]
    fn validate_sample_checks_length() {
        assert!(validate_sample(&[0, 1], 3, 2).is_ok());
        assert!(validate_sample(&[0], 3, 2).is_err());
    }
}
