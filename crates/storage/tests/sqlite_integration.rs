use quiz_core::model::{GameToken, QuestionDraft, QuestionId, TopicId, ValidatedQuestion};
use quiz_core::time::fixed_now;
use storage::repository::{
    GameRepository, NewGameRecord, NewTopicRecord, QuestionRepository, StorageError,
    TopicRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn capitals(repo: &SqliteRepository) -> TopicId {
    repo.insert_topic(NewTopicRecord {
        name: "Capitals".into(),
        description: "European capitals".into(),
        created_at: fixed_now(),
    })
    .await
    .unwrap()
    .id()
}

fn question(topic: TopicId, statement: &str, right: &str, wrong: &str) -> ValidatedQuestion {
    QuestionDraft::new(topic, statement)
        .with_option(right, true)
        .with_option(wrong, false)
        .with_explanation("")
        .validate()
        .unwrap()
}

async fn start_game(repo: &SqliteRepository, topic: TopicId, ids: Vec<QuestionId>) -> quiz_core::model::Game {
    repo.create_game(NewGameRecord {
        token: GameToken::generate(),
        topic_id: topic,
        created_at: fixed_now(),
        question_ids: ids,
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo.list_topics().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_persists_question_with_ordered_options() {
    let repo = connect("memdb_question_roundtrip").await;
    let topic = capitals(&repo).await;

    let draft = QuestionDraft::new(topic, "Capital of France?")
        .with_option("Paris", true)
        .with_option("Lyon", false)
        .with_option("Nice", false)
        .with_time_limit_ms(30_000)
        .with_explanation("Seat of government since 987.")
        .validate()
        .unwrap();
    let id = repo.insert_question(&draft, fixed_now()).await.unwrap();

    let stored = repo.get_question(id).await.unwrap().expect("question");
    assert_eq!(stored.statement(), "Capital of France?");
    assert_eq!(stored.time_limit_ms(), 30_000);
    assert_eq!(stored.explanation(), Some("Seat of government since 987."));

    let options = repo.get_options(id).await.unwrap();
    let texts: Vec<&str> = options.iter().map(|o| o.text()).collect();
    assert_eq!(texts, ["Paris", "Lyon", "Nice"]);
    assert!(options[0].is_correct());
    assert_eq!(repo.list_question_ids(topic).await.unwrap(), vec![id]);
}

#[tokio::test]
async fn sqlite_protects_topics_and_cascades_options() {
    let repo = connect("memdb_protection").await;
    let topic = capitals(&repo).await;
    let id = repo
        .insert_question(&question(topic, "Capital of Spain?", "Madrid", "Seville"), fixed_now())
        .await
        .unwrap();

    let err = repo.delete_topic(topic).await.unwrap_err();
    assert!(matches!(err, StorageError::Protected));

    repo.delete_question(id).await.unwrap();
    assert!(repo.get_options(id).await.unwrap().is_empty());
    repo.delete_topic(topic).await.unwrap();
    assert!(matches!(
        repo.delete_topic(topic).await.unwrap_err(),
        StorageError::NotFound
    ));
}

#[tokio::test]
async fn sqlite_rejects_question_for_unknown_topic() {
    let repo = connect("memdb_unknown_topic").await;
    let err = repo
        .insert_question(
            &question(TopicId::new(404), "Capital of Peru?", "Lima", "Cusco"),
            fixed_now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_batch_insert_is_all_or_nothing() {
    let repo = connect("memdb_batch").await;
    let topic = capitals(&repo).await;
    let batch = vec![
        question(topic, "Capital of Italy?", "Rome", "Milan"),
        question(TopicId::new(999), "Capital of Chile?", "Santiago", "Valparaiso"),
    ];

    assert!(repo.insert_questions(&batch, fixed_now()).await.is_err());
    assert!(repo.list_questions(None).await.unwrap().is_empty());

    let ids = repo
        .insert_questions(&batch[..1], fixed_now())
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn sqlite_game_advances_and_completes() {
    let repo = connect("memdb_game_flow").await;
    let topic = capitals(&repo).await;
    let q1 = repo
        .insert_question(&question(topic, "Capital of France?", "Paris", "Lyon"), fixed_now())
        .await
        .unwrap();
    let q2 = repo
        .insert_question(&question(topic, "Capital of Spain?", "Madrid", "Seville"), fixed_now())
        .await
        .unwrap();

    let game = start_game(&repo, topic, vec![q2, q1]).await;
    let slots = repo.get_slots(game.id()).await.unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].question_id(), q2);
    assert_eq!(game.current_slot(), Some(slots[0].id()));
    assert_eq!(
        repo.get_game_by_token(game.token()).await.unwrap(),
        Some(game.clone())
    );

    let madrid = repo.get_options(q2).await.unwrap()[0].id();
    let game = repo
        .record_answer(game.id(), slots[0].id(), madrid, fixed_now())
        .await
        .unwrap();
    assert_eq!(game.current_slot(), Some(slots[1].id()));

    let stale = repo
        .record_answer(game.id(), slots[0].id(), madrid, fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(stale, StorageError::Conflict));

    let paris = repo.get_options(q1).await.unwrap()[0].id();
    let game = repo
        .record_answer(game.id(), slots[1].id(), paris, fixed_now())
        .await
        .unwrap();
    assert!(game.is_complete());
    assert_eq!(game.completed_at(), Some(fixed_now()));

    let listed = repo.list_games(10).await.unwrap();
    assert_eq!(listed[0].topic_name, "Capitals");
    assert_eq!((listed[0].answered, listed[0].total), (2, 2));
}

#[tokio::test]
async fn sqlite_option_delete_nulls_selection_and_game_delete_releases_questions() {
    let repo = connect("memdb_set_null").await;
    let topic = capitals(&repo).await;
    let q = repo
        .insert_question(&question(topic, "Capital of Norway?", "Oslo", "Bergen"), fixed_now())
        .await
        .unwrap();
    let game = start_game(&repo, topic, vec![q]).await;
    let slot = repo.get_slots(game.id()).await.unwrap().remove(0);
    let options = repo.get_options(q).await.unwrap();
    repo.record_answer(game.id(), slot.id(), options[1].id(), fixed_now())
        .await
        .unwrap();

    assert!(matches!(
        repo.delete_question(q).await.unwrap_err(),
        StorageError::Protected
    ));

    let mut edited = question(topic, "Capital of Norway?", "Oslo", "Trondheim");
    edited.options[0].id = Some(options[0].id());
    repo.update_question(q, &edited).await.unwrap();

    let slot = repo.get_slots(game.id()).await.unwrap().remove(0);
    assert!(slot.is_answered());
    assert_eq!(slot.selected_option(), None);

    repo.delete_game(game.id()).await.unwrap();
    assert!(repo.get_game(game.id()).await.unwrap().is_none());
    repo.delete_question(q).await.unwrap();
}
