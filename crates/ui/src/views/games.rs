use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{GameToken, TopicId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{Flash, ViewError, ViewState, use_flash, view_state_from_resource};
use crate::vm::{GameRowVm, TopicOptionVm, map_game_rows, map_topic_options};

/// Games shown on the list page.
const GAME_LIST_LIMIT: u32 = 50;
const DEFAULT_QUESTION_COUNT: u32 = 10;

//
// ─── LIST ──────────────────────────────────────────────────────────────────────
//

#[component]
pub fn GameListView() -> Element {
    let ctx = use_context::<AppContext>();
    let games = ctx.games();
    let flash = use_flash();

    let resource = use_resource(move || {
        let games = games.clone();
        async move {
            let items = games
                .list_games(GAME_LIST_LIMIT)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(map_game_rows(&items))
        }
    });
    let state = view_state_from_resource(resource);

    let on_delete = {
        let games = ctx.games();
        use_callback(move |token: GameToken| {
            let games = games.clone();
            let mut resource = resource;
            spawn(async move {
                match games.delete_game(token).await {
                    Ok(()) => {
                        flash.show(Flash::success("Game was deleted successfully!"));
                        resource.restart();
                    }
                    Err(err) => flash.show(Flash::error(ViewError::from(err).message())),
                }
            });
        })
    };

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Games" }
                Link { class: "btn btn-primary", to: Route::GameCreate {}, "New game" }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No games yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Topic" }
                                    th { "Progress" }
                                    th { "Started" }
                                    th {}
                                }
                            }
                            tbody {
                                for row in rows {
                                    GameRow { row, on_delete }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn GameRow(row: GameRowVm, on_delete: Callback<GameToken>) -> Element {
    let token = row.token;
    let progress_class = if row.is_complete {
        "progress progress--done"
    } else {
        "progress"
    };
    rsx! {
        tr {
            td { "{row.topic_name}" }
            td { class: progress_class, "{row.progress}" }
            td { "{row.created_at_str}" }
            td { class: "row-actions",
                if !row.is_complete {
                    Link {
                        class: "btn btn-primary",
                        to: Route::GamePlay { token: token.to_string() },
                        "Play"
                    }
                }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| on_delete.call(token),
                    "Delete"
                }
            }
        }
    }
}

//
// ─── CREATE ────────────────────────────────────────────────────────────────────
//

#[component]
pub fn GameCreateView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut topic_id = use_signal(|| None::<TopicId>);
    let count = use_signal(|| DEFAULT_QUESTION_COUNT.to_string());
    let mut error = use_signal(|| None::<ViewError>);
    let mut creating = use_signal(|| false);

    let topics = ctx.topics();
    let resource = use_resource(move || {
        let topics = topics.clone();
        async move {
            let all_topics = topics.list_topics().await.map_err(ViewError::from)?;
            Ok::<_, ViewError>(map_topic_options(&all_topics))
        }
    });
    let state = view_state_from_resource(resource);

    use_effect(move || {
        if let Some(Ok(options)) = resource.value().read().as_ref() {
            if topic_id.peek().is_none() {
                topic_id.set(options.first().map(|topic| topic.id));
            }
        }
    });

    let on_create = {
        let games = ctx.games();
        use_callback(move |()| {
            if creating() {
                return;
            }
            let Some(topic) = topic_id() else {
                error.set(Some(ViewError::Invalid("Pick a topic to play.".to_string())));
                return;
            };
            let Some(requested) = count().trim().parse::<u32>().ok().filter(|n| *n > 0) else {
                error.set(Some(ViewError::Invalid(
                    "Number of questions must be greater than zero.".to_string(),
                )));
                return;
            };
            let games = games.clone();
            spawn(async move {
                creating.set(true);
                let result = games.create_game(topic, requested).await;
                creating.set(false);
                match result {
                    Ok(game) => {
                        navigator.push(Route::GamePlay {
                            token: game.token().to_string(),
                        });
                    }
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
            });
        })
    };

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "New game" }
            }
            match state {
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(options) => rsx! {
                    GameCreateForm {
                        options,
                        topic_id,
                        count,
                        error: error(),
                        creating: creating(),
                        on_create,
                    }
                },
            }
        }
    }
}

#[component]
fn GameCreateForm(
    options: Vec<TopicOptionVm>,
    mut topic_id: Signal<Option<TopicId>>,
    mut count: Signal<String>,
    error: Option<ViewError>,
    creating: bool,
    on_create: Callback<()>,
) -> Element {
    rsx! {
        form {
            class: "form",
            onsubmit: move |evt| {
                evt.prevent_default();
                on_create.call(());
            },
            label { class: "field",
                span { "Topic" }
                select {
                    name: "topic",
                    onchange: move |evt| topic_id.set(evt.value().parse::<TopicId>().ok()),
                    for topic in options {
                        option {
                            value: "{topic.id}",
                            selected: topic_id() == Some(topic.id),
                            "{topic.label}"
                        }
                    }
                }
            }
            label { class: "field",
                span { "Number of questions" }
                input {
                    r#type: "number",
                    min: "1",
                    name: "count",
                    value: "{count}",
                    oninput: move |evt| count.set(evt.value()),
                }
            }
            if let Some(err) = error {
                p { class: "form-error", "{err.message()}" }
            }
            div { class: "form-actions",
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: creating,
                    "Start"
                }
                Link { class: "btn btn-secondary", to: Route::Games {}, "Cancel" }
            }
        }
    }
}
