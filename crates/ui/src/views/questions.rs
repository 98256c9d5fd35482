use std::path::PathBuf;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{QuestionId, TopicId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{Flash, ViewError, ViewState, use_flash, view_state_from_resource};
use crate::vm::{
    QuestionFormVm, QuestionRowVm, TopicOptionVm, map_question_rows, map_topic_options,
};

#[derive(Clone, Debug, PartialEq)]
struct QuestionListData {
    topics: Vec<TopicOptionVm>,
    rows: Vec<QuestionRowVm>,
}

#[derive(Clone, Debug, PartialEq)]
struct QuestionFormData {
    topics: Vec<TopicOptionVm>,
    form: QuestionFormVm,
}

fn parse_topic(value: &str) -> Option<TopicId> {
    value.parse::<TopicId>().ok()
}

//
// ─── LIST ──────────────────────────────────────────────────────────────────────
//

#[component]
pub fn QuestionListView() -> Element {
    let ctx = use_context::<AppContext>();
    let topics = ctx.topics();
    let questions = ctx.questions();
    let flash = use_flash();
    let mut topic_filter = use_signal(|| None::<TopicId>);

    let resource = use_resource(move || {
        let topics = topics.clone();
        let questions = questions.clone();
        let filter = topic_filter();
        async move {
            let all_topics = topics.list_topics().await.map_err(ViewError::from)?;
            let items = questions
                .list_questions(filter)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(QuestionListData {
                topics: map_topic_options(&all_topics),
                rows: map_question_rows(&items),
            })
        }
    });
    let state = view_state_from_resource(resource);

    let on_delete = {
        let questions = ctx.questions();
        use_callback(move |id: QuestionId| {
            let questions = questions.clone();
            let mut resource = resource;
            spawn(async move {
                match questions.delete_question(id).await {
                    Ok(()) => {
                        flash.show(Flash::success("Question was deleted successfully!"));
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
                h2 { class: "view-title", "Questions" }
                div { class: "view-actions",
                    Link { class: "btn btn-primary", to: Route::QuestionCreate {}, "New question" }
                    Link { class: "btn btn-secondary", to: Route::QuestionImport {}, "Import questions" }
                }
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
                ViewState::Ready(data) => rsx! {
                    label { class: "field field--inline",
                        span { "Topic" }
                        select {
                            onchange: move |evt| topic_filter.set(parse_topic(&evt.value())),
                            option { value: "", "All topics" }
                            for topic in data.topics {
                                option {
                                    value: "{topic.id}",
                                    selected: topic_filter() == Some(topic.id),
                                    "{topic.label}"
                                }
                            }
                        }
                    }
                    if data.rows.is_empty() {
                        p { class: "empty", "No questions yet." }
                    } else {
                        table { class: "table",
                            thead {
                                tr {
                                    th { "Statement" }
                                    th { "Topic" }
                                    th { "Time" }
                                    th {}
                                }
                            }
                            tbody {
                                for row in data.rows {
                                    QuestionRow { row, on_delete }
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
fn QuestionRow(row: QuestionRowVm, on_delete: Callback<QuestionId>) -> Element {
    let id = row.id;
    rsx! {
        tr {
            td { "{row.statement}" }
            td { "{row.topic_name}" }
            td { "{row.time_label}" }
            td { class: "row-actions",
                Link { class: "btn btn-secondary", to: Route::QuestionEdit { question_id: id.value() }, "Edit" }
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
pub fn QuestionCreateView() -> Element {
    rsx! {
        QuestionForm { question_id: None }
    }
}

#[component]
pub fn QuestionEditView(question_id: u64) -> Element {
    rsx! {
        QuestionForm { question_id: Some(QuestionId::new(question_id)) }
    }
}

#[component]
fn QuestionForm(question_id: Option<QuestionId>) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let flash = use_flash();
    let mut form = use_signal(QuestionFormVm::default);
    let mut error = use_signal(|| None::<ViewError>);
    let mut saving = use_signal(|| false);

    let topics = ctx.topics();
    let questions_for_resource = ctx.questions();
    let resource = use_resource(move || {
        let topics = topics.clone();
        let questions = questions_for_resource.clone();
        async move {
            let all_topics = topics.list_topics().await.map_err(ViewError::from)?;
            let form = match question_id {
                Some(id) => {
                    let detail = questions
                        .get_question(id)
                        .await
                        .map_err(ViewError::from)?
                        .ok_or(ViewError::NotFound)?;
                    QuestionFormVm::from_detail(&detail)
                }
                None => QuestionFormVm {
                    topic_id: all_topics.first().map(|topic| topic.id()),
                    ..QuestionFormVm::default()
                },
            };
            Ok::<_, ViewError>(QuestionFormData {
                topics: map_topic_options(&all_topics),
                form,
            })
        }
    });
    let state = view_state_from_resource(resource);

    use_effect(move || {
        if let Some(Ok(data)) = resource.value().read().as_ref() {
            form.set(data.form.clone());
        }
    });

    let on_save = {
        let questions = ctx.questions();
        use_callback(move |()| {
            if saving() {
                return;
            }
            let draft = match form.read().to_draft() {
                Ok(draft) => draft,
                Err(err) => {
                    error.set(Some(ViewError::Invalid(err.message().to_string())));
                    return;
                }
            };
            let questions = questions.clone();
            spawn(async move {
                saving.set(true);
                let saved = match question_id {
                    Some(id) => questions
                        .update_question(id, draft)
                        .await
                        .map(|()| "Question was updated successfully!"),
                    None => questions
                        .create_question(draft)
                        .await
                        .map(|_| "Question was created successfully!"),
                };
                saving.set(false);
                match saved {
                    Ok(message) => {
                        flash.show(Flash::success(message));
                        navigator.push(Route::Questions {});
                    }
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
            });
        })
    };

    let title = if question_id.is_some() {
        "Edit question"
    } else {
        "New question"
    };
    let form_value = form();

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "{title}" }
            }
            match state {
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    Link { to: Route::Questions {}, "Back to questions" }
                },
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    form {
                        class: "form",
                        onsubmit: move |evt| {
                            evt.prevent_default();
                            on_save.call(());
                        },
                        label { class: "field",
                            span { "Topic" }
                            select {
                                name: "topic",
                                onchange: move |evt| form.write().topic_id = parse_topic(&evt.value()),
                                option { value: "", "Choose a topic" }
                                for topic in data.topics {
                                    option {
                                        value: "{topic.id}",
                                        selected: form_value.topic_id == Some(topic.id),
                                        "{topic.label}"
                                    }
                                }
                            }
                        }
                        label { class: "field",
                            span { "Statement" }
                            textarea {
                                name: "statement",
                                value: "{form_value.statement}",
                                oninput: move |evt| form.write().statement = evt.value(),
                            }
                        }
                        label { class: "field",
                            span { "Time (seconds)" }
                            input {
                                r#type: "number",
                                min: "1",
                                name: "time",
                                value: "{form_value.time_secs}",
                                oninput: move |evt| form.write().time_secs = evt.value(),
                            }
                        }
                        label { class: "field",
                            span { "Explanation" }
                            textarea {
                                name: "explanation",
                                value: "{form_value.explanation}",
                                oninput: move |evt| form.write().explanation = evt.value(),
                            }
                        }
                        fieldset { class: "options",
                            legend { "Options" }
                            for (index, row) in form_value.options.iter().cloned().enumerate() {
                                div { class: "option-row",
                                    span { class: "option-number", "{index + 1}." }
                                    input {
                                        r#type: "text",
                                        name: "option_{index + 1}",
                                        value: "{row.text}",
                                        oninput: move |evt| {
                                            if let Some(row) = form.write().options.get_mut(index) {
                                                row.text = evt.value();
                                            }
                                        },
                                    }
                                    label { class: "option-correct",
                                        input {
                                            r#type: "checkbox",
                                            checked: row.is_correct,
                                            onchange: move |evt| {
                                                if let Some(row) = form.write().options.get_mut(index) {
                                                    row.is_correct = evt.checked();
                                                }
                                            },
                                        }
                                        "Correct"
                                    }
                                }
                            }
                        }
                        if let Some(err) = error() {
                            p { class: "form-error", "{err.message()}" }
                        }
                        div { class: "form-actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "submit",
                                disabled: saving(),
                                "Save"
                            }
                            Link { class: "btn btn-secondary", to: Route::Questions {}, "Cancel" }
                        }
                    }
                },
            }
        }
    }
}

//
// ─── IMPORT ────────────────────────────────────────────────────────────────────
//

#[component]
pub fn QuestionImportView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let flash = use_flash();
    let mut topic_id = use_signal(|| None::<TopicId>);
    let mut path = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut importing = use_signal(|| false);

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

    let on_import = {
        let questions = ctx.questions();
        use_callback(move |()| {
            if importing() {
                return;
            }
            let Some(topic) = topic_id() else {
                error.set(Some(ViewError::Invalid(
                    "Pick a topic for the imported questions.".to_string(),
                )));
                return;
            };
            let file = PathBuf::from(path().trim());
            if file.as_os_str().is_empty() {
                error.set(Some(ViewError::Invalid(
                    "Enter the path of a CSV or Excel file.".to_string(),
                )));
                return;
            }
            let questions = questions.clone();
            spawn(async move {
                importing.set(true);
                let result = questions.import_file(topic, &file).await;
                importing.set(false);
                match result {
                    Ok(report) => {
                        flash.show(Flash::success(format!(
                            "{} questions have been added successfully!",
                            report.imported()
                        )));
                        navigator.push(Route::Questions {});
                    }
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
            });
        })
    };

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "Import questions" }
                p { class: "view-subtitle",
                    "Columns (CSV or first Excel sheet): statement, time (ms), explanation, option_1 to option_4, answer (1-4)."
                }
            }
            match state {
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(options) => rsx! {
                    form {
                        class: "form",
                        onsubmit: move |evt| {
                            evt.prevent_default();
                            on_import.call(());
                        },
                        label { class: "field",
                            span { "Topic" }
                            select {
                                name: "topic",
                                onchange: move |evt| topic_id.set(parse_topic(&evt.value())),
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
                            span { "Spreadsheet file" }
                            input {
                                r#type: "text",
                                name: "file",
                                placeholder: "/path/to/questions.xlsx",
                                value: "{path}",
                                oninput: move |evt| path.set(evt.value()),
                            }
                        }
                        if let Some(err) = error() {
                            p { class: "form-error", "{err.message()}" }
                        }
                        div { class: "form-actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "submit",
                                disabled: importing(),
                                "Import"
                            }
                            Link { class: "btn btn-secondary", to: Route::Questions {}, "Cancel" }
                        }
                    }
                },
            }
        }
    }
}
