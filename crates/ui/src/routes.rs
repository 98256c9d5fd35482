use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{
    FlashBanner, GameCreateView, GameListView, PlayView, QuestionCreateView, QuestionEditView,
    QuestionImportView, QuestionListView, TopicCreateView, TopicEditView, TopicListView,
    provide_flash,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", TopicListView)] Home {},
        #[route("/topics", TopicListView)] Topics {},
        #[route("/topics/new", TopicCreateView)] TopicCreate {},
        #[route("/topics/:topic_id/edit", TopicEditView)] TopicEdit { topic_id: u64 },
        #[route("/questions", QuestionListView)] Questions {},
        #[route("/questions/new", QuestionCreateView)] QuestionCreate {},
        #[route("/questions/import", QuestionImportView)] QuestionImport {},
        #[route("/questions/:question_id/edit", QuestionEditView)] QuestionEdit { question_id: u64 },
        #[route("/games", GameListView)] Games {},
        #[route("/games/new", GameCreateView)] GameCreate {},
        #[route("/games/:token/play", PlayView)] GamePlay { token: String },
}

#[component]
fn Layout() -> Element {
    provide_flash();
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                FlashBanner {}
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Quiz Maker" }
            ul {
                li { Link { to: Route::Topics {}, "Topics" } }
                li { Link { to: Route::Questions {}, "Questions" } }
                li { Link { to: Route::Games {}, "Games" } }
            }
        }
    }
}
