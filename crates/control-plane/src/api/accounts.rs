// Standalone account routes backed by SessionLoginService
// Decision: These routes sit outside the gate and use their own `session_id` cookie
// Decision: Unknown sessions, emails and reset tokens all answer 403

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use gatehouse_core::AuthError;
use serde::Deserialize;
use serde_json::{json, Value};

use super::common::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequestForm {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reset_token: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/users", post(register))
        .route("/sessions", post(login).delete(logout))
        .route("/profile", get(profile))
        .route(
            "/reset_password",
            post(get_reset_password_token).put(update_password),
        )
        .with_state(state)
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} missing", name)))
}

/// GET /
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Bienvenue" }))
}

/// POST /users - Register from form fields
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let email = required(form.email, "email")?;
    let password = required(form.password, "password")?;

    match state.login.register(&email, &password).await {
        Ok(_) => Ok(Json(json!({ "email": email, "message": "user created" })).into_response()),
        Err(AuthError::AlreadyExists(_)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "email already registered" })),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// POST /sessions - Log in and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let email = form.email.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    if !state.login.verify_login(&email, &password).await {
        return Err(ApiError::unauthorized());
    }
    let session_id = state
        .login
        .create_session(&email)
        .await
        .ok_or_else(ApiError::unauthorized)?;

    let jar = jar.add(Cookie::build((SESSION_COOKIE, session_id)).path("/"));
    Ok((jar, Json(json!({ "email": email, "message": "logged in" }))))
}

/// DELETE /sessions - Log out and go home
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let principal = state
        .login
        .principal_for_session(session_id.as_deref())
        .await
        .ok_or_else(ApiError::forbidden)?;

    state.login.destroy_session(principal.id).await;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")))
}

/// GET /profile - Email of the session owner
pub async fn profile(State(state): State<AppState>, jar: CookieJar) -> Result<Json<Value>, ApiError> {
    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value());
    let email = state
        .login
        .resolve_identifier_by_session(session_id)
        .await
        .ok_or_else(ApiError::forbidden)?;
    Ok(Json(json!({ "email": email })))
}

/// POST /reset_password - Issue a reset token
pub async fn get_reset_password_token(
    State(state): State<AppState>,
    Form(form): Form<ResetRequestForm>,
) -> Result<Json<Value>, ApiError> {
    let email = form.email.unwrap_or_default();
    let token = state
        .login
        .issue_reset_token(&email)
        .await
        .map_err(|e| match e {
            AuthError::NotFound(_) => ApiError::forbidden(),
            other => other.into(),
        })?;
    Ok(Json(json!({ "email": email, "reset_token": token })))
}

/// PUT /reset_password - Redeem a reset token
pub async fn update_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<Value>, ApiError> {
    let email = form.email.unwrap_or_default();
    let token = form.reset_token.unwrap_or_default();
    let new_password = required(form.new_password, "new_password")?;

    state
        .login
        .redeem_reset_token(&token, &new_password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidToken => ApiError::forbidden(),
            other => other.into(),
        })?;
    Ok(Json(json!({ "email": email, "message": "Password updated" })))
}
