//! User route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use songpin_core::{User, UserId};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Registration body. `user_id`/`username` are accepted for older clients.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(alias = "user_id")]
    pub id: String,
    #[serde(alias = "username")]
    pub display_name: String,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// `POST /api/users` (also `/api/users/register`)
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload.map_err(|r| AppError::Validation(r.body_text()))?;
    let id = UserId::parse(&request.id)?;
    let user = User::new(id, &request.display_name)?;

    let user = state.store().create_user(user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

/// `GET /api/users`
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.store().list_users().await?))
}

/// `GET /api/users/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id = UserId::parse(&id)?;
    state
        .store()
        .get_user(&id)
        .await?
        .map(Json)
        .ok_or_else(user_not_found)
}

/// `DELETE /api/users/{id}`: refused while the user still has pins.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = UserId::parse(&id)?;
    match state.store().delete_user(&id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "User deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(RepositoryError::NotFound) => Err(user_not_found()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_body_aliases() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"user_id":"12345","username":"Alice"}"#).unwrap();
        assert_eq!(req.id, "12345");
        assert_eq!(req.display_name, "Alice");

        let req: CreateUserRequest =
            serde_json::from_str(r#"{"id":"67890","display_name":"Bob"}"#).unwrap();
        assert_eq!(req.id, "67890");
    }
}
