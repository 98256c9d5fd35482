use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{Game, GameId, GameQuestion, GameQuestionId, GameToken, OptionId};
use storage::repository::{GameListRecord, GameRepository, NewGameRecord, Storage, StorageError};

use super::test_harness::{
    ViewKind, in_memory_services, seed_capitals, services_over, setup_view_harness,
};

#[tokio::test(flavor = "current_thread")]
async fn topic_list_smoke_renders_rows() {
    let services = in_memory_services();
    seed_capitals(&services).await;

    let mut harness = setup_view_harness(ViewKind::Topics, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Capitals"), "missing topic in {html}");
    assert!(html.contains("European capitals"), "missing description in {html}");
    assert!(html.contains("New topic"), "missing create link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn topic_list_smoke_renders_empty_state() {
    let mut harness = setup_view_harness(ViewKind::Topics, in_memory_services());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No topics yet"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn topic_edit_smoke_prefills_form() {
    let services = in_memory_services();
    let topic_id = seed_capitals(&services).await;

    let mut harness = setup_view_harness(ViewKind::TopicEdit(topic_id.value()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Edit topic"), "missing title in {html}");
    assert!(html.contains("Capitals"), "missing name in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn topic_edit_smoke_reports_missing_topic() {
    let mut harness = setup_view_harness(ViewKind::TopicEdit(99), in_memory_services());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("That item no longer exists."), "missing error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn question_list_smoke_renders_time_in_seconds() {
    let services = in_memory_services();
    seed_capitals(&services).await;

    let mut harness = setup_view_harness(ViewKind::Questions, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Capital of France?"), "missing statement in {html}");
    assert!(html.contains("45s"), "missing time label in {html}");
    assert!(html.contains("All topics"), "missing filter in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn question_create_smoke_renders_four_option_rows() {
    let services = in_memory_services();
    seed_capitals(&services).await;

    let mut harness = setup_view_harness(ViewKind::QuestionCreate, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("New question"), "missing title in {html}");
    for n in 1..=4 {
        let name = format!("option_{n}");
        assert!(html.contains(&name), "missing {name} in {html}");
    }
}

#[tokio::test(flavor = "current_thread")]
async fn question_edit_smoke_prefills_options() {
    let services = in_memory_services();
    seed_capitals(&services).await;
    let question_id = services.questions().list_questions(None).await.unwrap()[0]
        .question
        .id();

    let mut harness = setup_view_harness(ViewKind::QuestionEdit(question_id.value()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Edit question"), "missing title in {html}");
    assert!(html.contains("Paris"), "missing option text in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn game_create_smoke_lists_topics() {
    let services = in_memory_services();
    seed_capitals(&services).await;

    let mut harness = setup_view_harness(ViewKind::GameCreate, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Number of questions"), "missing count field in {html}");
    assert!(html.contains("Capitals"), "missing topic option in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn game_list_smoke_renders_progress() {
    let services = in_memory_services();
    let topic_id = seed_capitals(&services).await;
    services.games().create_game(topic_id, 2).await.unwrap();

    let mut harness = setup_view_harness(ViewKind::Games, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("0/2"), "missing progress in {html}");
    assert!(html.contains("Play"), "missing play link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn game_list_smoke_marks_finished_games_complete() {
    let services = in_memory_services();
    let topic_id = seed_capitals(&services).await;
    let games = services.games();
    let token = games.create_game(topic_id, 2).await.unwrap().token();
    while let Some(slot) = games.current_question(token).await.unwrap() {
        games.submit_answer(token, slot.options[0].id()).await.unwrap();
    }

    let mut harness = setup_view_harness(ViewKind::Games, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Complete"), "missing completion in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn play_view_smoke_renders_lettered_choices() {
    let services = in_memory_services();
    let topic_id = seed_capitals(&services).await;
    let token = services.games().create_game(topic_id, 2).await.unwrap().token();

    let mut harness = setup_view_harness(ViewKind::Play(token.to_string()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 1 of 2"), "missing heading in {html}");
    assert!(html.contains("choice--primary"), "missing first colour in {html}");
    assert!(html.contains("choice--success"), "missing second colour in {html}");
    assert!(html.contains("45s"), "missing countdown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn play_view_smoke_reports_finished_game() {
    let services = in_memory_services();
    let topic_id = seed_capitals(&services).await;
    let games = services.games();
    let token = games.create_game(topic_id, 1).await.unwrap().token();
    let slot = games.current_question(token).await.unwrap().unwrap();
    games.submit_answer(token, slot.options[0].id()).await.unwrap();

    let mut harness = setup_view_harness(ViewKind::Play(token.to_string()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("This game is complete."), "missing completion in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn play_view_smoke_rejects_bad_token() {
    let mut harness = setup_view_harness(ViewKind::Play("not-a-token".into()), in_memory_services());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("That item no longer exists."), "missing error in {html}");
}

struct FailingGameRepo;

#[async_trait::async_trait]
impl GameRepository for FailingGameRepo {
    async fn create_game(&self, _game: NewGameRecord) -> Result<Game, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_game(&self, _id: GameId) -> Result<Option<Game>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_game_by_token(&self, _token: GameToken) -> Result<Option<Game>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_games(&self, _limit: u32) -> Result<Vec<GameListRecord>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_slots(&self, _game: GameId) -> Result<Vec<GameQuestion>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn record_answer(
        &self,
        _game: GameId,
        _slot: GameQuestionId,
        _option: OptionId,
        _answered_at: DateTime<Utc>,
    ) -> Result<Game, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn delete_game(&self, _id: GameId) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn game_list_smoke_renders_error_state() {
    let storage = Storage {
        games: Arc::new(FailingGameRepo),
        ..Storage::in_memory()
    };
    let mut harness = setup_view_harness(ViewKind::Games, services_over(&storage));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}
