// Users API routes
// Decision: `me` resolves to the principal attached by the gate
// Decision: Malformed ids read as unknown users (404), not bad requests

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use gatehouse_core::{hash_password, Principal, UserFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::ApiError;
use crate::auth::middleware::CurrentUser;
use crate::state::AppState;

/// Public view of a principal; never carries credentials or tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Principal> for UserResponse {
    fn from(p: Principal) -> Self {
        Self {
            display_name: p.display_name(),
            id: p.id,
            email: p.email,
            first_name: p.first_name,
            last_name: p.last_name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Create users routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}

async fn find_user(state: &AppState, user_id: &str) -> Result<Principal, ApiError> {
    let id = Uuid::parse_str(user_id).map_err(|_| ApiError::not_found())?;
    state
        .directory
        .get(id)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// GET /api/v1/users - List all users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.directory.search(&UserFilter::all()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/:user_id - One user, or the caller for `me`
pub async fn get_user(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    if user_id == "me" {
        let CurrentUser(principal) = current.ok_or_else(ApiError::not_found)?;
        return Ok(Json(principal.into()));
    }
    Ok(Json(find_user(&state, &user_id).await?.into()))
}

/// POST /api/v1/users - Create a user from JSON
pub async fn create_user(
    State(state): State<AppState>,
    body: Option<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Some(Json(req)) = body else {
        return Err(ApiError::bad_request("Wrong format"));
    };
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("email missing"))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password missing"))?;

    let hash = hash_password(&password)
        .map_err(|e| ApiError::bad_request(format!("Can't create User: {}", e)))?;
    let mut principal = Principal::new(email, hash);
    principal.first_name = req.first_name;
    principal.last_name = req.last_name;

    state.directory.save(&principal).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to save user");
        ApiError::bad_request(format!("Can't create User: {}", e))
    })?;

    tracing::info!(user_id = %principal.id, "User created");
    Ok((StatusCode::CREATED, Json(principal.into())))
}

/// PUT /api/v1/users/:user_id - Update names
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Option<Json<UpdateUserRequest>>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut principal = find_user(&state, &user_id).await?;
    let Some(Json(req)) = body else {
        return Err(ApiError::bad_request("Wrong format"));
    };

    if let Some(first_name) = req.first_name {
        principal.first_name = Some(first_name);
    }
    if let Some(last_name) = req.last_name {
        principal.last_name = Some(last_name);
    }
    principal.touch();
    state.directory.save(&principal).await?;
    Ok(Json(principal.into()))
}

/// DELETE /api/v1/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let principal = find_user(&state, &user_id).await?;
    if !state.directory.remove(principal.id).await? {
        return Err(ApiError::not_found());
    }
    tracing::info!(user_id = %principal.id, "User deleted");
    Ok(Json(serde_json::json!({})))
}
