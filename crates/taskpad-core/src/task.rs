use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// Opaque attachment reference. Carries no storage path.
    #[serde(rename = "image_filename")]
    pub image_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl CreateTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }
}

/// The complete desired state of every mutable field of a task.
///
/// Fields missing from a request body take their default value. A sparse
/// body therefore clears whatever it leaves out; it is never merged with the
/// stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaceTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, rename = "image_filename")]
    pub image_reference: Option<String>,
}

impl From<&Task> for ReplaceTask {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            is_completed: task.is_completed,
            image_reference: task.image_reference.clone(),
        }
    }
}

impl Task {
    /// Start a full-replace draft from this record's current state.
    pub fn to_replace(&self) -> ReplaceTask {
        ReplaceTask::from(self)
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title must not be empty"));
    }
    Ok(())
}
