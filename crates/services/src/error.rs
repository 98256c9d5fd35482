//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, TopicError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the game engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    /// The topic has no questions, or zero questions were requested.
    #[error("no questions available for this game")]
    EmptyPool,
    #[error("option does not belong to the current question")]
    InvalidOption,
    #[error("game is already complete")]
    GameAlreadyComplete,
    #[error("topic not found")]
    TopicNotFound,
    #[error("game not found")]
    GameNotFound,
    /// The sampler returned a duplicate or out-of-range index.
    #[error("question sampler returned an invalid selection")]
    InvalidSample,
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

/// Errors emitted by `TopicService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TopicServiceError {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error("topic not found")]
    NotFound,
    #[error("topic still has questions")]
    InUse,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for TopicServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            StorageError::Protected => Self::InUse,
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `QuestionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionServiceError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error("topic not found")]
    TopicNotFound,
    #[error("question not found")]
    NotFound,
    #[error("question is used by a game")]
    InUse,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for QuestionServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            StorageError::Protected => Self::InUse,
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted while importing questions from a spreadsheet.
///
/// `row` is the 1-based data row, not counting the header.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("the file has no question rows")]
    Empty,
    #[error("row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row}: answer must be the number of a filled option (got {raw:?})")]
    InvalidAnswer { row: usize, raw: String },
    #[error("row {row}: time must be a positive number of milliseconds (got {raw:?})")]
    InvalidTime { row: usize, raw: String },
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: QuestionError,
    },
    #[error("unsupported file type {0:?}, expected .csv, .xlsx or .xls")]
    UnsupportedFormat(String),
    #[error("not a readable workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("topic not found")]
    TopicNotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
