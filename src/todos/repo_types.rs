use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    /// Milliseconds since the epoch; set iff `completed`.
    pub completed_at: Option<i64>,
    pub creator: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub text: String,
    pub creator: Uuid,
}

/// Resolved update. Completion state is always written as a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub text: Option<String>,
    pub completed: bool,
    pub completed_at: Option<i64>,
}
