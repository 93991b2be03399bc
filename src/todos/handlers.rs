use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateTodoRequest, TodoEnvelope, TodoList, UpdateTodoRequest},
    repo_types::Todo,
    services,
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(payload) = payload?;
    let todo = services::create(state.todos.as_ref(), auth.user.id, payload).await?;
    Ok(Json(todo))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn list_todos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TodoList>, ApiError> {
    let todos = services::list(state.todos.as_ref(), auth.user.id).await?;
    Ok(Json(TodoList { todos }))
}

// The id stays a raw string so malformed ids fall into the same 404 as missing ones.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn get_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let todo = services::get(state.todos.as_ref(), auth.user.id, &id).await?;
    Ok(Json(TodoEnvelope { todo }))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.user.id))]
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let Json(payload) = payload?;
    let todo = services::update(state.todos.as_ref(), auth.user.id, &id, payload).await?;
    Ok(Json(TodoEnvelope { todo }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let todo = services::remove(state.todos.as_ref(), auth.user.id, &id).await?;
    Ok(Json(TodoEnvelope { todo }))
}
