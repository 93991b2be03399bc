use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewTodo, Todo, TodoChanges};
use crate::db::StoreResult;

/// Todo persistence. Everything past `insert` is scoped to `creator` inside
/// the query itself, so a foreign id reads exactly like a missing one.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo>;
    /// Insertion order.
    async fn list_by_creator(&self, creator: Uuid) -> StoreResult<Vec<Todo>>;
    async fn find_owned(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>>;
    async fn update_owned(
        &self,
        id: Uuid,
        creator: Uuid,
        changes: TodoChanges,
    ) -> StoreResult<Option<Todo>>;
    async fn delete_owned(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>>;
}

#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (id, text, creator)
            VALUES ($1, $2, $3)
            RETURNING id, text, completed, completed_at, creator
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&todo.text)
        .bind(todo.creator)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_creator(&self, creator: Uuid) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, text, completed, completed_at, creator
              FROM todos
             WHERE creator = $1
             ORDER BY seq ASC
            "#,
        )
        .bind(creator)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_owned(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, text, completed, completed_at, creator
              FROM todos
             WHERE id = $1 AND creator = $2
            "#,
        )
        .bind(id)
        .bind(creator)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        creator: Uuid,
        changes: TodoChanges,
    ) -> StoreResult<Option<Todo>> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
               SET text = COALESCE($3, text),
                   completed = $4,
                   completed_at = $5
             WHERE id = $1 AND creator = $2
            RETURNING id, text, completed, completed_at, creator
            "#,
        )
        .bind(id)
        .bind(creator)
        .bind(changes.text)
        .bind(changes.completed)
        .bind(changes.completed_at)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_owned(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            DELETE FROM todos
             WHERE id = $1 AND creator = $2
            RETURNING id, text, completed, completed_at, creator
            "#,
        )
        .bind(id)
        .bind(creator)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
