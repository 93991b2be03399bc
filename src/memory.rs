//! In-process stores used by the test suite.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{
    claims::ACCESS_AUTH,
    repo::UserStore,
    repo_types::{AuthToken, NewUser, ProfileUpdate, User},
};
use crate::db::{StoreError, StoreResult};
use crate::todos::{
    repo::TodoStore,
    repo_types::{NewTodo, Todo, TodoChanges},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    todos: Vec<Todo>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Other(anyhow::anyhow!("memory store poisoned")))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            tokens: Vec::new(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| {
                u.id == id
                    && u
                        .tokens
                        .iter()
                        .any(|t| t.token == token && t.access == ACCESS_AUTH)
            })
            .cloned())
    }

    async fn push_token(&self, id: Uuid, token: AuthToken) -> StoreResult<()> {
        if let Some(u) = self.lock()?.users.iter_mut().find(|u| u.id == id) {
            u.tokens.push(token);
        }
        Ok(())
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        if let Some(u) = self.lock()?.users.iter_mut().find(|u| u.id == id) {
            u.tokens.retain(|t| t.token != token);
        }
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> StoreResult<Option<User>> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.id != id && u.email == update.email) {
            return Err(StoreError::DuplicateEmail);
        }
        Ok(t.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = update.name;
            u.email = update.email;
            u.password_hash = update.password_hash;
            u.clone()
        }))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            text: todo.text,
            completed: false,
            completed_at: None,
            creator: todo.creator,
        };
        self.lock()?.todos.push(todo.clone());
        Ok(todo)
    }

    async fn list_by_creator(&self, creator: Uuid) -> StoreResult<Vec<Todo>> {
        Ok(self
            .lock()?
            .todos
            .iter()
            .filter(|t| t.creator == creator)
            .cloned()
            .collect())
    }

    async fn find_owned(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        Ok(self
            .lock()?
            .todos
            .iter()
            .find(|t| t.id == id && t.creator == creator)
            .cloned())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        creator: Uuid,
        changes: TodoChanges,
    ) -> StoreResult<Option<Todo>> {
        Ok(self
            .lock()?
            .todos
            .iter_mut()
            .find(|t| t.id == id && t.creator == creator)
            .map(|t| {
                if let Some(text) = changes.text {
                    t.text = text;
                }
                t.completed = changes.completed;
                t.completed_at = changes.completed_at;
                t.clone()
            }))
    }

    async fn delete_owned(&self, id: Uuid, creator: Uuid) -> StoreResult<Option<Todo>> {
        let mut tables = self.lock()?;
        let pos = tables
            .todos
            .iter()
            .position(|t| t.id == id && t.creator == creator);
        Ok(pos.map(|i| tables.todos.remove(i)))
    }
}
