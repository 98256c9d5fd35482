use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{GameToken, OptionId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{Flash, ViewError, ViewState, use_flash, view_state_from_resource};
use crate::vm::{PlayOptionVm, PlayVm, answer_message, format_secs, map_play_slot};

const TICK: Duration = Duration::from_secs(1);

/// Plays the current question of a game addressed by its token.
///
/// `Ready(None)` means the game has no question left.
#[component]
pub fn PlayView(token: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let flash = use_flash();
    let token = token.parse::<GameToken>().ok();
    let mut remaining = use_signal(|| 0_u64);
    let mut submitting = use_signal(|| false);

    let games = ctx.games();
    let resource = use_resource(move || {
        let games = games.clone();
        async move {
            let token = token.ok_or(ViewError::NotFound)?;
            let slot = games
                .current_question(token)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(slot.as_ref().map(map_play_slot))
        }
    });
    let state = view_state_from_resource(resource);

    use_effect(move || {
        if let Some(Ok(Some(vm))) = resource.value().read().as_ref() {
            remaining.set(vm.time_limit_secs);
        }
    });

    use_future(move || async move {
        loop {
            tokio::time::sleep(TICK).await;
            let left = *remaining.peek();
            if left > 0 {
                remaining.set(left - 1);
            }
        }
    });

    let on_answer = {
        let games = ctx.games();
        use_callback(move |option_id: OptionId| {
            let Some(token) = token else {
                return;
            };
            if submitting() {
                return;
            }
            let games = games.clone();
            let mut resource = resource;
            spawn(async move {
                submitting.set(true);
                let result = games.submit_answer(token, option_id).await;
                submitting.set(false);
                match result {
                    Ok(answer) => {
                        flash.show(Flash::answer(answer_message(&answer), answer.is_correct));
                        if answer.is_complete() {
                            navigator.push(Route::Games {});
                        } else {
                            resource.restart();
                        }
                    }
                    Err(err) => {
                        flash.show(Flash::error(ViewError::from(err).message()));
                        resource.restart();
                    }
                }
            });
        })
    };

    rsx! {
        div { class: "page play-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    Link { to: Route::Games {}, "Back to games" }
                },
                ViewState::Ready(None) => rsx! {
                    p { "This game is complete." }
                    Link { to: Route::Games {}, "Back to games" }
                },
                ViewState::Ready(Some(vm)) => rsx! {
                    QuestionCard {
                        vm,
                        remaining: remaining(),
                        submitting: submitting(),
                        on_answer,
                    }
                },
            }
        }
    }
}

#[component]
fn QuestionCard(vm: PlayVm, remaining: u64, submitting: bool, on_answer: Callback<OptionId>) -> Element {
    let countdown = if remaining > 0 {
        format_secs(remaining)
    } else {
        "Time's up".to_string()
    };
    let countdown_class = if remaining > 0 {
        "countdown"
    } else {
        "countdown countdown--expired"
    };

    rsx! {
        header { class: "view-header",
            h2 { class: "view-title", "Question {vm.number} of {vm.total}" }
            span { class: countdown_class, "{countdown}" }
        }
        p { class: "statement", "{vm.statement}" }
        div { class: "choices",
            for option in vm.options {
                ChoiceButton { option, submitting, on_answer }
            }
        }
    }
}

#[component]
fn ChoiceButton(option: PlayOptionVm, submitting: bool, on_answer: Callback<OptionId>) -> Element {
    let id = option.id;
    rsx! {
        button {
            class: "{option.color_class}",
            r#type: "button",
            disabled: submitting,
            onclick: move |_| on_answer.call(id),
            span { class: "choice-letter", "{option.letter}" }
            span { class: "choice-text", "{option.text}" }
        }
    }
}
