use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    dto::{CreateTodoRequest, UpdateTodoRequest},
    repo::TodoStore,
    repo_types::{NewTodo, Todo, TodoChanges},
};
use crate::error::ApiError;

/// A malformed id is reported exactly like a missing or foreign one.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        debug!(id = raw, "malformed todo id");
        ApiError::NotFound
    })
}

fn clean_text(text: &str) -> Result<String, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("text is required"));
    }
    Ok(text.to_string())
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Completion timestamp is derived from `completed` alone.
pub fn resolve_changes(patch: UpdateTodoRequest, now_ms: i64) -> Result<TodoChanges, ApiError> {
    let text = patch.text.as_deref().map(clean_text).transpose()?;
    let completed = matches!(patch.completed, Some(Value::Bool(true)));
    Ok(TodoChanges {
        text,
        completed,
        completed_at: completed.then_some(now_ms),
    })
}

pub async fn create(
    todos: &dyn TodoStore,
    owner: Uuid,
    req: CreateTodoRequest,
) -> Result<Todo, ApiError> {
    let text = clean_text(req.text.as_deref().unwrap_or_default())?;
    let todo = todos.insert(NewTodo { text, creator: owner }).await?;
    info!(todo_id = %todo.id, user_id = %owner, "todo created");
    Ok(todo)
}

pub async fn list(todos: &dyn TodoStore, owner: Uuid) -> Result<Vec<Todo>, ApiError> {
    Ok(todos.list_by_creator(owner).await?)
}

pub async fn get(todos: &dyn TodoStore, owner: Uuid, id: &str) -> Result<Todo, ApiError> {
    let id = parse_id(id)?;
    todos.find_owned(id, owner).await?.ok_or(ApiError::NotFound)
}

pub async fn update(
    todos: &dyn TodoStore,
    owner: Uuid,
    id: &str,
    patch: UpdateTodoRequest,
) -> Result<Todo, ApiError> {
    let id = parse_id(id)?;
    let changes = resolve_changes(patch, now_millis())?;
    let todo = todos
        .update_owned(id, owner, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(todo_id = %todo.id, completed = todo.completed, "todo updated");
    Ok(todo)
}

pub async fn remove(todos: &dyn TodoStore, owner: Uuid, id: &str) -> Result<Todo, ApiError> {
    let id = parse_id(id)?;
    let todo = todos
        .delete_owned(id, owner)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(todo_id = %todo.id, "todo removed");
    Ok(todo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn create_req(text: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            text: Some(text.into()),
        }
    }

    #[test]
    fn completing_sets_timestamp() {
        let changes = resolve_changes(
            UpdateTodoRequest {
                text: None,
                completed: Some(Value::Bool(true)),
            },
            1_700_000_000_000,
        )
        .unwrap();
        assert!(changes.completed);
        assert_eq!(changes.completed_at, Some(1_700_000_000_000));
    }

    #[test]
    fn anything_but_true_clears_completion() {
        for completed in [
            Some(Value::Bool(false)),
            Some(Value::from("true")),
            Some(Value::from(1)),
            Some(Value::Null),
            None,
        ] {
            let changes = resolve_changes(
                UpdateTodoRequest {
                    text: Some("  walk the dog ".into()),
                    completed,
                },
                42,
            )
            .unwrap();
            assert!(!changes.completed);
            assert_eq!(changes.completed_at, None);
            assert_eq!(changes.text.as_deref(), Some("walk the dog"));
        }
    }

    #[test]
    fn blank_text_in_patch_is_rejected() {
        let err = resolve_changes(
            UpdateTodoRequest {
                text: Some("   ".into()),
                completed: None,
            },
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn create_trims_and_rejects_empty() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let todo = create(&store, owner, create_req("  First test todo ")).await.unwrap();
        assert_eq!(todo.text, "First test todo");
        assert!(!todo.completed);
        assert_eq!(todo.completed_at, None);
        assert_eq!(todo.creator, owner);

        for req in [create_req(""), create_req("   "), CreateTodoRequest { text: None }] {
            assert!(matches!(
                create(&store, owner, req).await.unwrap_err(),
                ApiError::Validation(_)
            ));
        }
        assert_eq!(list(&store, owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_owner_scoped_in_insertion_order() {
        let store = MemoryStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        create(&store, a, create_req("one")).await.unwrap();
        create(&store, b, create_req("theirs")).await.unwrap();
        create(&store, a, create_req("two")).await.unwrap();

        let texts: Vec<String> = list(&store, a).await.unwrap().into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn foreign_missing_and_malformed_ids_look_the_same() {
        let store = MemoryStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let todo = create(&store, a, create_req("private")).await.unwrap();
        let id = todo.id.to_string();
        let missing = Uuid::new_v4().to_string();

        for raw in [id.as_str(), missing.as_str(), "123"] {
            assert!(matches!(get(&store, b, raw).await.unwrap_err(), ApiError::NotFound));
            assert!(matches!(
                update(&store, b, raw, UpdateTodoRequest { text: Some("hijack".into()), completed: Some(Value::Bool(true)) })
                    .await
                    .unwrap_err(),
                ApiError::NotFound
            ));
            assert!(matches!(remove(&store, b, raw).await.unwrap_err(), ApiError::NotFound));
        }

        assert_eq!(get(&store, a, &id).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn update_toggles_completion() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let todo = create(&store, owner, create_req("Second test todo")).await.unwrap();
        let id = todo.id.to_string();

        let done = update(&store, owner, &id, UpdateTodoRequest { text: None, completed: Some(Value::Bool(true)) })
            .await
            .unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.text, "Second test todo");

        let undone = update(
            &store,
            owner,
            &id,
            UpdateTodoRequest {
                text: Some("renamed".into()),
                completed: Some(Value::Bool(false)),
            },
        )
        .await
        .unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.completed_at, None);
        assert_eq!(undone.text, "renamed");
    }

    #[tokio::test]
    async fn remove_returns_the_record_once() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let todo = create(&store, owner, create_req("bye")).await.unwrap();
        let id = todo.id.to_string();

        assert_eq!(remove(&store, owner, &id).await.unwrap(), todo);
        assert!(matches!(remove(&store, owner, &id).await.unwrap_err(), ApiError::NotFound));
        assert!(list(&store, owner).await.unwrap().is_empty());
    }
}
