#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod games;
pub mod import;
pub mod question_service;
pub mod topic_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, GameError, ImportError, QuestionServiceError, TopicServiceError,
};
pub use games::{
    GameAnswerResult, GameEngine, GameListItem, PlaySlot, QuestionSampler, RandomSampler,
    SeededSampler,
};
pub use import::{ImportReport, SheetFormat};
pub use question_service::{QuestionDetail, QuestionListItem, QuestionService};
pub use topic_service::TopicService;
