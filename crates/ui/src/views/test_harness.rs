use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{QuestionDraft, TopicId};
use quiz_core::time::fixed_clock;
use services::{AppServices, GameEngine, QuestionService, TopicService};
use storage::repository::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::{
    FlashBanner, GameCreateView, GameListView, PlayView, QuestionCreateView, QuestionEditView,
    QuestionListView, TopicEditView, TopicListView, provide_flash,
};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn topics(&self) -> Arc<TopicService> {
        self.services.topics()
    }

    fn questions(&self) -> Arc<QuestionService> {
        self.services.questions()
    }

    fn games(&self) -> Arc<GameEngine> {
        self.services.games()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Topics,
    TopicEdit(u64),
    Questions,
    QuestionCreate,
    QuestionEdit(u64),
    Games,
    GameCreate,
    Play(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    provide_flash();
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    let page = match view {
        ViewKind::Topics => rsx! { TopicListView {} },
        ViewKind::TopicEdit(topic_id) => rsx! { TopicEditView { topic_id } },
        ViewKind::Questions => rsx! { QuestionListView {} },
        ViewKind::QuestionCreate => rsx! { QuestionCreateView {} },
        ViewKind::QuestionEdit(question_id) => rsx! { QuestionEditView { question_id } },
        ViewKind::Games => rsx! { GameListView {} },
        ViewKind::GameCreate => rsx! { GameCreateView {} },
        ViewKind::Play(token) => rsx! { PlayView { token } },
    };
    rsx! {
        FlashBanner {}
        {page}
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let resources and effects resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

#[must_use]
pub fn in_memory_services() -> AppServices {
    AppServices::in_memory(fixed_clock())
}

#[must_use]
pub fn services_over(storage: &Storage) -> AppServices {
    AppServices::from_storage(storage, fixed_clock())
}

/// Seeds a "Capitals" topic with two questions.
pub async fn seed_capitals(services: &AppServices) -> TopicId {
    let topic = services
        .topics()
        .create_topic("Capitals", "European capitals")
        .await
        .expect("create topic");
    for (statement, right, wrong) in [
        ("Capital of France?", "Paris", "Lyon"),
        ("Capital of Italy?", "Rome", "Milan"),
    ] {
        services
            .questions()
            .create_question(
                QuestionDraft::new(topic.id(), statement)
                    .with_option(right, true)
                    .with_option(wrong, false),
            )
            .await
            .expect("create question");
    }
    topic.id()
}

pub fn setup_view_harness(view: ViewKind, services: AppServices) -> ViewHarness {
    let app = Arc::new(TestApp {
        services: services.clone(),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom, services }
}
