use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::TopicId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{Flash, ViewError, ViewState, use_flash, view_state_from_resource};
use crate::vm::{TopicRowVm, map_topic_rows};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveState {
    Idle,
    Saving,
}

//
// ─── LIST ──────────────────────────────────────────────────────────────────────
//

#[component]
pub fn TopicListView() -> Element {
    let ctx = use_context::<AppContext>();
    let topics = ctx.topics();
    let flash = use_flash();

    let resource = use_resource(move || {
        let topics = topics.clone();
        async move {
            let items = topics.list_topics().await.map_err(ViewError::from)?;
            Ok::<_, ViewError>(map_topic_rows(&items))
        }
    });
    let state = view_state_from_resource(resource);

    let on_delete = {
        let topics = ctx.topics();
        use_callback(move |id: TopicId| {
            let topics = topics.clone();
            let mut resource = resource;
            spawn(async move {
                match topics.delete_topic(id).await {
                    Ok(()) => {
                        flash.show(Flash::success("Topic was deleted successfully!"));
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
                h2 { class: "view-title", "Topics" }
                Link { class: "btn btn-primary", to: Route::TopicCreate {}, "New topic" }
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
                        p { class: "empty", "No topics yet. Create one to start adding questions." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Name" }
                                    th { "Description" }
                                    th { "Created" }
                                    th {}
                                }
                            }
                            tbody {
                                for row in rows {
                                    TopicRow { row, on_delete }
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
fn TopicRow(row: TopicRowVm, on_delete: Callback<TopicId>) -> Element {
    let id = row.id;
    rsx! {
        tr {
            td { "{row.name}" }
            td { "{row.description}" }
            td { "{row.created_at_str}" }
            td { class: "row-actions",
                Link { class: "btn btn-secondary", to: Route::TopicEdit { topic_id: id.value() }, "Edit" }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| on_delete.call(id),
                    "Delete"
                }
            }
        }
    }
}

//
// ─── FORM ──────────────────────────────────────────────────────────────────────
//

#[component]
pub fn TopicCreateView() -> Element {
    rsx! {
        TopicForm { topic_id: None }
    }
}

#[component]
pub fn TopicEditView(topic_id: u64) -> Element {
    rsx! {
        TopicForm { topic_id: Some(TopicId::new(topic_id)) }
    }
}

#[component]
fn TopicForm(topic_id: Option<TopicId>) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let flash = use_flash();
    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut save_state = use_signal(|| SaveState::Idle);

    let topics_for_resource = ctx.topics();
    let resource = use_resource(move || {
        let topics = topics_for_resource.clone();
        async move {
            let Some(id) = topic_id else {
                return Ok(None);
            };
            let topic = topics
                .get_topic(id)
                .await
                .map_err(ViewError::from)?
                .ok_or(ViewError::NotFound)?;
            Ok::<_, ViewError>(Some(topic))
        }
    });
    let state = view_state_from_resource(resource);

    use_effect(move || {
        if let Some(Ok(Some(topic))) = resource.value().read().as_ref() {
            name.set(topic.name().to_owned());
            description.set(topic.description().to_owned());
        }
    });

    let on_save = {
        let topics = ctx.topics();
        use_callback(move |()| {
            if save_state() == SaveState::Saving {
                return;
            }
            let topics = topics.clone();
            let name = name();
            let description = description();
            spawn(async move {
                save_state.set(SaveState::Saving);
                let saved = match topic_id {
                    Some(id) => topics
                        .update_topic(id, &name, &description)
                        .await
                        .map(|_| "Topic was updated successfully!"),
                    None => topics
                        .create_topic(&name, &description)
                        .await
                        .map(|_| "Topic was created successfully!"),
                };
                save_state.set(SaveState::Idle);
                match saved {
                    Ok(message) => {
                        flash.show(Flash::success(message));
                        navigator.push(Route::Topics {});
                    }
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
            });
        })
    };

    let title = if topic_id.is_some() { "Edit topic" } else { "New topic" };

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "{title}" }
            }
            match state {
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    Link { to: Route::Topics {}, "Back to topics" }
                },
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(_) => rsx! {
                    form {
                        class: "form",
                        onsubmit: move |evt| {
                            evt.prevent_default();
                            on_save.call(());
                        },
                        label { class: "field",
                            span { "Name" }
                            input {
                                r#type: "text",
                                name: "name",
                                value: "{name}",
                                oninput: move |evt| name.set(evt.value()),
                            }
                        }
                        label { class: "field",
                            span { "Description" }
                            textarea {
                                name: "description",
                                value: "{description}",
                                oninput: move |evt| description.set(evt.value()),
                            }
                        }
                        if let Some(err) = error() {
                            p { class: "form-error", "{err.message()}" }
                        }
                        div { class: "form-actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "submit",
                                disabled: save_state() == SaveState::Saving,
                                "Save"
                            }
                            Link { class: "btn btn-secondary", to: Route::Topics {}, "Cancel" }
                        }
                    }
                },
            }
        }
    }
}
