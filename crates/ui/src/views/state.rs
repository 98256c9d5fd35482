use dioxus::prelude::*;
use services::{GameError, ImportError, QuestionServiceError, TopicServiceError};

/// Failures a view can show to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    NotFound,
    EmptyTopic,
    TopicInUse,
    QuestionInUse,
    InvalidOption,
    GameComplete,
    /// Input rejected by validation; carries the reason.
    Invalid(String),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unknown => "Something went wrong. Please try again.",
            Self::NotFound => "That item no longer exists.",
            Self::EmptyTopic => "This topic has no questions yet.",
            Self::TopicInUse => "This topic still has questions or games. Delete those first.",
            Self::QuestionInUse => "This question is part of a game. Delete the game first.",
            Self::InvalidOption => "That answer is not an option of the current question.",
            Self::GameComplete => "This game is already complete.",
            Self::Invalid(reason) => reason,
        }
    }
}

impl From<GameError> for ViewError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::EmptyPool => Self::EmptyTopic,
            GameError::InvalidOption => Self::InvalidOption,
            GameError::GameAlreadyComplete => Self::GameComplete,
            GameError::TopicNotFound | GameError::GameNotFound => Self::NotFound,
            _ => Self::Unknown,
        }
    }
}

impl From<TopicServiceError> for ViewError {
    fn from(err: TopicServiceError) -> Self {
        match err {
            TopicServiceError::Topic(reason) => Self::Invalid(capitalize(&reason.to_string())),
            TopicServiceError::NotFound => Self::NotFound,
            TopicServiceError::InUse => Self::TopicInUse,
            _ => Self::Unknown,
        }
    }
}

impl From<QuestionServiceError> for ViewError {
    fn from(err: QuestionServiceError) -> Self {
        match err {
            QuestionServiceError::Question(reason) => {
                Self::Invalid(capitalize(&reason.to_string()))
            }
            QuestionServiceError::TopicNotFound | QuestionServiceError::NotFound => Self::NotFound,
            QuestionServiceError::InUse => Self::QuestionInUse,
            _ => Self::Unknown,
        }
    }
}

impl From<ImportError> for ViewError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::TopicNotFound => Self::NotFound,
            ImportError::Storage(_) => Self::Unknown,
            other => Self::Invalid(capitalize(&other.to_string())),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
