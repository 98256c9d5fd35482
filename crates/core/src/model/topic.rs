use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::TopicId;

/// Maximum length of a topic name, in characters.
pub const TOPIC_NAME_MAX_LEN: usize = 100;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,

    #[error("topic name must be at most {max} characters (got {len})")]
    NameTooLong { len: usize, max: usize },
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A named subject area grouping questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl Topic {
    /// Creates a new Topic.
    ///
    /// Name and description are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyName` if name is empty or whitespace-only.
    /// Returns `TopicError::NameTooLong` if name exceeds `TOPIC_NAME_MAX_LEN`.
    pub fn new(
        id: TopicId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TopicError> {
        let name = validate_name(&name.into())?;
        let description = description.into().trim().to_owned();

        Ok(Self {
            id,
            name,
            description,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validates and normalizes a topic name.
///
/// # Errors
///
/// Returns `TopicError` when the trimmed name is empty or too long.
pub fn validate_name(raw: &str) -> Result<String, TopicError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(TopicError::EmptyName);
    }
    let len = name.chars().count();
    if len > TOPIC_NAME_MAX_LEN {
        return Err(TopicError::NameTooLong {
            len,
            max: TOPIC_NAME_MAX_LEN,
        });
    }
    Ok(name.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
