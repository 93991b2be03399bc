use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{LoginRequest, PublicUser, RegisterRequest, UpdateProfileRequest},
    extractors::{AuthUser, AUTH_HEADER},
    jwt::JwtKeys,
    services::{self, Session},
};
use crate::{error::ApiError, state::AppState};

type SessionResponse = ([(&'static str, String); 1], Json<PublicUser>);

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/me/token", delete(logout))
}

fn session_response(session: Session) -> SessionResponse {
    ([(AUTH_HEADER, session.token)], Json(session.user.into()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<SessionResponse, ApiError> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let session = services::register(state.users.as_ref(), &keys, payload).await?;
    Ok(session_response(session))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<SessionResponse, ApiError> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let session = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(session_response(session))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn get_me(auth: AuthUser) -> Json<PublicUser> {
    Json(auth.user.into())
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Json(payload) = payload?;
    let user = services::update_profile(state.users.as_ref(), &auth.user, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode, ApiError> {
    services::logout(state.users.as_ref(), &auth.user, &auth.token).await?;
    Ok(StatusCode::OK)
}
