use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One issued credential kept on the user for revocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct AuthToken {
    pub access: String,
    pub token: String,
}

/// User record as the services see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,                  // unique user ID
    pub name: String,              // display name
    pub email: String,             // trimmed, unique
    #[serde(skip_serializing)]
    pub password_hash: String,     // argon2 hash, never exposed in JSON
    #[serde(skip_serializing)]
    pub tokens: Vec<AuthToken>,    // issued tokens in insertion order
}

/// Row shape of `users`; tokens are loaded separately.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl UserRow {
    pub fn with_tokens(self, tokens: Vec<AuthToken>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            tokens,
        }
    }
}

/// Validated, already-hashed input for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Full replacement of the mutable profile columns.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
