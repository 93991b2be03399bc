use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{jwt::JwtKeys, repo_types::User, services};
use crate::{error::ApiError, state::AppState};

/// Header carrying the raw token, both on requests and on login/register responses.
pub const AUTH_HEADER: &str = "x-auth";

/// Authenticated caller: the resolved user plus the token they presented.
#[derive(Debug)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?
            .to_string();

        let keys = JwtKeys::from_ref(state);
        let user = services::authenticate(state.users.as_ref(), &keys, &token).await?;
        Ok(AuthUser { user, token })
    }
}
