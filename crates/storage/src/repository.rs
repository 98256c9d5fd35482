use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerOption, Game, GameId, GameQuestion, GameQuestionId, GameToken, OptionId, Question,
    QuestionId, Topic, TopicId, ValidatedQuestion, next_slot,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    /// The row is still referenced and cannot be deleted.
    #[error("still referenced by other records")]
    Protected,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Insert shape for a topic; the backend assigns the id.
#[derive(Debug, Clone)]
pub struct NewTopicRecord {
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a game and its slots.
///
/// `question_ids` is the play order: slot `order` is the 1-based index.
#[derive(Debug, Clone)]
pub struct NewGameRecord {
    pub token: GameToken,
    pub topic_id: TopicId,
    pub created_at: DateTime<Utc>,
    pub question_ids: Vec<QuestionId>,
}

/// Row of the game list, with progress already aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameListRecord {
    pub game: Game,
    pub topic_name: String,
    pub answered: u32,
    pub total: u32,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Insert a new topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the topic cannot be stored.
    async fn insert_topic(&self, topic: NewTopicRecord) -> Result<Topic, StorageError>;

    /// Overwrite name and description of an existing topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic does not exist.
    async fn update_topic(&self, topic: &Topic) -> Result<(), StorageError>;

    /// Fetch a topic by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError>;

    /// List all topics ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError>;

    /// Delete a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Protected` while questions or games reference it,
    /// `StorageError::NotFound` if it does not exist.
    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question and its options in one write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic does not exist.
    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
        created_at: DateTime<Utc>,
    ) -> Result<QuestionId, StorageError>;

    /// Insert a batch of questions; either all of them are stored or none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if any topic does not exist.
    async fn insert_questions(
        &self,
        questions: &[ValidatedQuestion],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError>;

    /// Replace a question's fields and reconcile its option set.
    ///
    /// Options carrying an id are updated in place, options without one are
    /// inserted, and stored options missing from the input are deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question, its topic, or a
    /// referenced option id does not exist for this question.
    async fn update_question(
        &self,
        id: QuestionId,
        question: &ValidatedQuestion,
    ) -> Result<(), StorageError>;

    /// Fetch a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// List questions ordered by id, optionally restricted to one topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self, topic: Option<TopicId>)
    -> Result<Vec<Question>, StorageError>;

    /// Ids of every question in a topic, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_question_ids(&self, topic: TopicId) -> Result<Vec<QuestionId>, StorageError>;

    /// Options of a question ordered by position. Empty for unknown questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_options(&self, question: QuestionId) -> Result<Vec<AnswerOption>, StorageError>;

    /// Delete a question and, by cascade, its options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Protected` while a game slot references it,
    /// `StorageError::NotFound` if it does not exist.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Create a game, its slots, and point it at slot 1, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the topic or a question is missing,
    /// `StorageError::Conflict` for an empty question list.
    async fn create_game(&self, game: NewGameRecord) -> Result<Game, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_game_by_token(&self, token: GameToken) -> Result<Option<Game>, StorageError>;

    /// Most recent games first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_games(&self, limit: u32) -> Result<Vec<GameListRecord>, StorageError>;

    /// Slots of a game ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_slots(&self, game: GameId) -> Result<Vec<GameQuestion>, StorageError>;

    /// Record `option` on `slot` and advance the game past it.
    ///
    /// This is a compare-and-set: it only applies while `slot` is still the
    /// game's current slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if `slot` is no longer current (or the
    /// game is complete), `StorageError::NotFound` if the game is missing.
    async fn record_answer(
        &self,
        game: GameId,
        slot: GameQuestionId,
        option: OptionId,
        answered_at: DateTime<Utc>,
    ) -> Result<Game, StorageError>;

    /// Delete a game and its slots.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the game does not exist.
    async fn delete_game(&self, id: GameId) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    last_id: u64,
    topics: BTreeMap<TopicId, Topic>,
    questions: BTreeMap<QuestionId, Question>,
    options: BTreeMap<OptionId, AnswerOption>,
    games: BTreeMap<GameId, Game>,
    slots: BTreeMap<GameQuestionId, GameQuestion>,
}

impl MemoryState {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_question(
        &mut self,
        question: &ValidatedQuestion,
        created_at: DateTime<Utc>,
    ) -> QuestionId {
        let id = QuestionId::new(self.next_id());
        self.questions
            .insert(id, Question::from_validated(id, question, created_at));
        for option in &question.options {
            let option_id = OptionId::new(self.next_id());
            self.options.insert(
                option_id,
                AnswerOption::from_persisted(
                    option_id,
                    id,
                    option.text.clone(),
                    option.is_correct,
                    option.position,
                ),
            );
        }
        id
    }

    fn slots_of(&self, game: GameId) -> Vec<GameQuestion> {
        let mut slots: Vec<GameQuestion> = self
            .slots
            .values()
            .filter(|s| s.game_id() == game)
            .cloned()
            .collect();
        slots.sort_by_key(GameQuestion::order);
        slots
    }

    fn delete_option(&mut self, id: OptionId) {
        self.options.remove(&id);
        for slot in self.slots.values_mut() {
            slot.clear_selected_option(id);
        }
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// All tables live behind one mutex so multi-row writes are atomic.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn insert_topic(&self, topic: NewTopicRecord) -> Result<Topic, StorageError> {
        let mut guard = self.lock()?;
        let id = TopicId::new(guard.next_id());
        let topic = Topic::new(id, topic.name, topic.description, topic.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.topics.insert(id, topic.clone());
        Ok(topic)
    }

    async fn update_topic(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let slot = guard
            .topics
            .get_mut(&topic.id())
            .ok_or(StorageError::NotFound)?;
        *slot = topic.clone();
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        Ok(self.lock()?.topics.get(&id).cloned())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        Ok(self.lock()?.topics.values().cloned().collect())
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.topics.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        let referenced = guard.questions.values().any(|q| q.topic_id() == id)
            || guard.games.values().any(|g| g.topic_id() == id);
        if referenced {
            return Err(StorageError::Protected);
        }
        guard.topics.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
        created_at: DateTime<Utc>,
    ) -> Result<QuestionId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.topics.contains_key(&question.topic_id) {
            return Err(StorageError::NotFound);
        }
        Ok(guard.insert_question(question, created_at))
    }

    async fn insert_questions(
        &self,
        questions: &[ValidatedQuestion],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError> {
        let mut guard = self.lock()?;
        if questions
            .iter()
            .any(|q| !guard.topics.contains_key(&q.topic_id))
        {
            return Err(StorageError::NotFound);
        }
        Ok(questions
            .iter()
            .map(|q| guard.insert_question(q, created_at))
            .collect())
    }

    async fn update_question(
        &self,
        id: QuestionId,
        question: &ValidatedQuestion,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let created_at = guard
            .questions
            .get(&id)
            .map(Question::created_at)
            .ok_or(StorageError::NotFound)?;
        if !guard.topics.contains_key(&question.topic_id) {
            return Err(StorageError::NotFound);
        }
        let owned = question
            .options
            .iter()
            .filter_map(|o| o.id)
            .all(|oid| guard.options.get(&oid).is_some_and(|o| o.question_id() == id));
        if !owned {
            return Err(StorageError::NotFound);
        }

        guard
            .questions
            .insert(id, Question::from_validated(id, question, created_at));

        let kept: HashSet<OptionId> = question.options.iter().filter_map(|o| o.id).collect();
        let stale: Vec<OptionId> = guard
            .options
            .values()
            .filter(|o| o.question_id() == id && !kept.contains(&o.id()))
            .map(AnswerOption::id)
            .collect();
        for option_id in stale {
            guard.delete_option(option_id);
        }

        for option in &question.options {
            let option_id = match option.id {
                Some(existing) => existing,
                None => OptionId::new(guard.next_id()),
            };
            guard.options.insert(
                option_id,
                AnswerOption::from_persisted(
                    option_id,
                    id,
                    option.text.clone(),
                    option.is_correct,
                    option.position,
                ),
            );
        }
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        Ok(self.lock()?.questions.get(&id).cloned())
    }

    async fn list_questions(
        &self,
        topic: Option<TopicId>,
    ) -> Result<Vec<Question>, StorageError> {
        Ok(self
            .lock()?
            .questions
            .values()
            .filter(|q| topic.is_none_or(|t| q.topic_id() == t))
            .cloned()
            .collect())
    }

    async fn list_question_ids(&self, topic: TopicId) -> Result<Vec<QuestionId>, StorageError> {
        Ok(self
            .lock()?
            .questions
            .values()
            .filter(|q| q.topic_id() == topic)
            .map(Question::id)
            .collect())
    }

    async fn get_options(&self, question: QuestionId) -> Result<Vec<AnswerOption>, StorageError> {
        let guard = self.lock()?;
        let mut options: Vec<AnswerOption> = guard
            .options
            .values()
            .filter(|o| o.question_id() == question)
            .cloned()
            .collect();
        options.sort_by_key(AnswerOption::position);
        Ok(options)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.questions.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if guard.slots.values().any(|s| s.question_id() == id) {
            return Err(StorageError::Protected);
        }
        guard.questions.remove(&id);
        guard.options.retain(|_, o| o.question_id() != id);
        Ok(())
    }
}

#[async_trait]
impl GameRepository for InMemoryRepository {
    async fn create_game(&self, game: NewGameRecord) -> Result<Game, StorageError> {
        let mut guard = self.lock()?;
        if game.question_ids.is_empty() {
            return Err(StorageError::Conflict);
        }
        if !guard.topics.contains_key(&game.topic_id)
            || game
                .question_ids
                .iter()
                .any(|q| !guard.questions.contains_key(q))
        {
            return Err(StorageError::NotFound);
        }

        let game_id = GameId::new(guard.next_id());
        let mut first_slot = None;
        for (index, question_id) in game.question_ids.iter().enumerate() {
            let order = u32::try_from(index + 1)
                .map_err(|_| StorageError::Serialization("slot order overflow".into()))?;
            let slot_id = GameQuestionId::new(guard.next_id());
            first_slot.get_or_insert(slot_id);
            guard
                .slots
                .insert(slot_id, GameQuestion::new(slot_id, game_id, *question_id, order));
        }
        let first_slot = first_slot.ok_or(StorageError::Conflict)?;

        let created = Game::start(
            game_id,
            game.token,
            game.topic_id,
            first_slot,
            game.created_at,
        );
        guard.games.insert(game_id, created.clone());
        Ok(created)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StorageError> {
        Ok(self.lock()?.games.get(&id).cloned())
    }

    async fn get_game_by_token(&self, token: GameToken) -> Result<Option<Game>, StorageError> {
        Ok(self
            .lock()?
            .games
            .values()
            .find(|g| g.token() == token)
            .cloned())
    }

    async fn list_games(&self, limit: u32) -> Result<Vec<GameListRecord>, StorageError> {
        let guard = self.lock()?;
        let mut games: Vec<&Game> = guard.games.values().collect();
        games.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut records = Vec::with_capacity(games.len().min(take));
        for game in games.into_iter().take(take) {
            let slots = guard.slots_of(game.id());
            let answered = slots.iter().filter(|s| s.is_answered()).count();
            let topic_name = guard
                .topics
                .get(&game.topic_id())
                .map(|t| t.name().to_owned())
                .unwrap_or_default();
            records.push(GameListRecord {
                game: game.clone(),
                topic_name,
                answered: u32::try_from(answered).unwrap_or(u32::MAX),
                total: u32::try_from(slots.len()).unwrap_or(u32::MAX),
            });
        }
        Ok(records)
    }

    async fn get_slots(&self, game: GameId) -> Result<Vec<GameQuestion>, StorageError> {
        Ok(self.lock()?.slots_of(game))
    }

    async fn record_answer(
        &self,
        game: GameId,
        slot: GameQuestionId,
        option: OptionId,
        answered_at: DateTime<Utc>,
    ) -> Result<Game, StorageError> {
        let mut guard = self.lock()?;
        let mut updated = guard.games.get(&game).cloned().ok_or(StorageError::NotFound)?;
        let slots = guard.slots_of(game);
        let mut current = slots
            .iter()
            .find(|s| s.id() == slot)
            .cloned()
            .ok_or(StorageError::Conflict)?;
        let next = next_slot(&slots, &current).map(GameQuestion::id);

        updated
            .advance(slot, next, answered_at)
            .map_err(|_| StorageError::Conflict)?;
        current
            .record_answer(option, answered_at)
            .map_err(|_| StorageError::Conflict)?;

        guard.slots.insert(slot, current);
        guard.games.insert(game, updated.clone());
        Ok(updated)
    }

    async fn delete_game(&self, id: GameId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.games.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        guard.slots.retain(|_, s| s.game_id() != id);
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub topics: Arc<dyn TopicRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub games: Arc<dyn GameRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let topics: Arc<dyn TopicRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let games: Arc<dyn GameRepository> = Arc::new(repo);
        Self {
            topics,
            questions,
            games,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::fixed_now;

    async fn topic(repo: &InMemoryRepository, name: &str) -> Topic {
        repo.insert_topic(NewTopicRecord {
            name: name.into(),
            description: String::new(),
            created_at: fixed_now(),
        })
        .await
        .unwrap()
    }

    fn draft(topic_id: TopicId, statement: &str) -> ValidatedQuestion {
        QuestionDraft::new(topic_id, statement)
            .with_option("right", true)
            .with_option("wrong", false)
            .validate()
            .unwrap()
    }

    async fn game_with(repo: &InMemoryRepository, topic_id: TopicId, ids: Vec<QuestionId>) -> Game {
        repo.create_game(NewGameRecord {
            token: GameToken::generate(),
            topic_id,
            created_at: fixed_now(),
            question_ids: ids,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn topic_with_questions_is_protected() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q = repo
            .insert_question(&draft(t.id(), "Capital of France?"), fixed_now())
            .await
            .unwrap();

        let err = repo.delete_topic(t.id()).await.unwrap_err();
        assert!(matches!(err, StorageError::Protected));

        repo.delete_question(q).await.unwrap();
        repo.delete_topic(t.id()).await.unwrap();
        assert!(repo.get_topic(t.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn question_delete_cascades_options() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q = repo
            .insert_question(&draft(t.id(), "Capital of Spain?"), fixed_now())
            .await
            .unwrap();
        assert_eq!(repo.get_options(q).await.unwrap().len(), 2);

        repo.delete_question(q).await.unwrap();
        assert!(repo.get_options(q).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_question_reconciles_options() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q = repo
            .insert_question(&draft(t.id(), "Capital of Italy?"), fixed_now())
            .await
            .unwrap();
        let before = repo.get_options(q).await.unwrap();

        let mut edited = QuestionDraft::new(t.id(), "Capital of Italy?")
            .with_option("Rome", true)
            .with_option("Milan", false)
            .validate()
            .unwrap();
        edited.options[0].id = Some(before[0].id());

        repo.update_question(q, &edited).await.unwrap();
        let after = repo.get_options(q).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id(), before[0].id());
        assert_eq!(after[0].text(), "Rome");
        assert_ne!(after[1].id(), before[1].id());
        assert_eq!(after[1].text(), "Milan");
    }

    #[tokio::test]
    async fn record_answer_advances_once() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q1 = repo.insert_question(&draft(t.id(), "A?"), fixed_now()).await.unwrap();
        let q2 = repo.insert_question(&draft(t.id(), "B?"), fixed_now()).await.unwrap();
        let game = game_with(&repo, t.id(), vec![q2, q1]).await;

        let slots = repo.get_slots(game.id()).await.unwrap();
        assert_eq!(slots.iter().map(GameQuestion::order).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(slots[0].question_id(), q2);
        assert_eq!(game.current_slot(), Some(slots[0].id()));

        let option = repo.get_options(q2).await.unwrap()[0].id();
        let advanced = repo
            .record_answer(game.id(), slots[0].id(), option, fixed_now())
            .await
            .unwrap();
        assert_eq!(advanced.current_slot(), Some(slots[1].id()));

        let err = repo
            .record_answer(game.id(), slots[0].id(), option, fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn deleting_selected_option_clears_slot_reference() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q = repo.insert_question(&draft(t.id(), "A?"), fixed_now()).await.unwrap();
        let game = game_with(&repo, t.id(), vec![q]).await;
        let slot = repo.get_slots(game.id()).await.unwrap().remove(0);
        let options = repo.get_options(q).await.unwrap();
        repo.record_answer(game.id(), slot.id(), options[1].id(), fixed_now())
            .await
            .unwrap();

        // Keep only the first option.
        let mut edited = QuestionDraft::new(t.id(), "A?")
            .with_option("right", true)
            .with_option("other", false)
            .validate()
            .unwrap();
        edited.options[0].id = Some(options[0].id());
        repo.update_question(q, &edited).await.unwrap();

        let slot = repo.get_slots(game.id()).await.unwrap().remove(0);
        assert!(slot.is_answered());
        assert_eq!(slot.selected_option(), None);
    }

    #[tokio::test]
    async fn question_in_game_is_protected_until_game_deleted() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q = repo.insert_question(&draft(t.id(), "A?"), fixed_now()).await.unwrap();
        let game = game_with(&repo, t.id(), vec![q]).await;

        let err = repo.delete_question(q).await.unwrap_err();
        assert!(matches!(err, StorageError::Protected));

        repo.delete_game(game.id()).await.unwrap();
        repo.delete_question(q).await.unwrap();
    }

    #[tokio::test]
    async fn list_games_reports_progress() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let q = repo.insert_question(&draft(t.id(), "A?"), fixed_now()).await.unwrap();
        let game = game_with(&repo, t.id(), vec![q]).await;
        let slot = repo.get_slots(game.id()).await.unwrap().remove(0);
        let option = repo.get_options(q).await.unwrap()[0].id();
        repo.record_answer(game.id(), slot.id(), option, fixed_now())
            .await
            .unwrap();

        let listed = repo.list_games(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].topic_name, "Capitals");
        assert_eq!((listed[0].answered, listed[0].total), (1, 1));
        assert!(listed[0].game.is_complete());
    }

    #[tokio::test]
    async fn create_game_rejects_unknown_question() {
        let repo = InMemoryRepository::new();
        let t = topic(&repo, "Capitals").await;
        let err = repo
            .create_game(NewGameRecord {
                token: GameToken::generate(),
                topic_id: t.id(),
                created_at: fixed_now(),
                question_ids: vec![QuestionId::new(999)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert!(repo.list_games(10).await.unwrap().is_empty());
    }
}
