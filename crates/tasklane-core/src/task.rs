use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::wire::document_id;

/// A todo item as the server returns it.
///
/// The server owns `id` and `completed`; the client only ever copies them
/// out of responses. Extra fields the server attaches (owner, timestamps)
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskDocument")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
struct TaskDocument {
    #[serde(rename = "_id")]
    underscore_id: Option<String>,
    id: Option<String>,
    title: String,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<TaskDocument> for Task {
    type Error = String;

    fn try_from(doc: TaskDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document_id(doc.underscore_id, doc.id)?,
            title: doc.title,
            completed: doc.completed,
        })
    }
}

impl Task {
    pub fn checkbox(&self) -> &'static str {
        if self.completed {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
}

impl CreateTask {
    /// Build a create request from raw input. Blank input is rejected; the
    /// title itself is sent as typed.
    pub fn new(raw_title: &str) -> Result<Self, CoreError> {
        if raw_title.trim().is_empty() {
            return Err(CoreError::InvalidInput("title must not be blank".into()));
        }
        Ok(Self {
            title: raw_title.to_string(),
        })
    }
}

/// Position of the task with `id`, by exact id equality.
pub fn position_of(tasks: &[Task], id: &str) -> Option<usize> {
    tasks.iter().position(|t| t.id == id)
}
