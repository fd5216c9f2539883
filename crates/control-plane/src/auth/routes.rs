// Session authentication HTTP routes
// Decision: Login is exempt from the gate by default; logout goes through it
// Decision: Both answer 404 when the active strategy does not issue sessions

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use gatehouse_core::{verify_password, SessionStrategy, UserFilter};
use serde::Deserialize;

use super::middleware::HttpRequestContext;
use crate::api::common::ApiError;
use crate::api::users::UserResponse;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/api/v1/auth_session/login";
pub const LOGOUT_PATH: &str = "/api/v1/auth_session/logout";

/// Login form
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, post(login))
        .route(LOGOUT_PATH, delete(logout))
        .with_state(state)
}

fn session_strategy(state: &AppState) -> Result<&dyn SessionStrategy, ApiError> {
    state
        .strategy
        .as_deref()
        .and_then(|strategy| strategy.as_session())
        .ok_or_else(ApiError::not_found)
}

fn session_cookie(state: &AppState, name: String, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value)).path("/").http_only(true).build();
    if let Some(ttl) = state.auth_config.session_ttl() {
        cookie.set_max_age(time::Duration::seconds(ttl.num_seconds()));
    }
    cookie
}

/// POST /api/v1/auth_session/login - Open a session from email and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let email = form
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("email missing"))?;
    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password missing"))?;

    let session = session_strategy(&state)?;
    // Without a cookie name no session is created
    let Some(cookie_name) = session.cookie_name().map(str::to_string) else {
        tracing::warn!("SESSION_NAME is not set; session login unavailable");
        return Err(ApiError::not_found());
    };

    let candidates = state
        .directory
        .search(&UserFilter::email(&email))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "User search failed during login");
            ApiError::from(e)
        })?;
    if candidates.is_empty() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "no user found for this email",
        ));
    }

    let user = candidates
        .into_iter()
        .find(|candidate| verify_password(&password, &candidate.password_hash))
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "wrong password"))?;

    let session_id = session
        .create_session(&user.id.to_string())
        .await
        .ok_or_else(|| ApiError::internal("Could not create session"))?;

    let jar = jar.add(session_cookie(&state, cookie_name, session_id));

    tracing::info!(user_id = %user.id, "Session login");
    Ok((jar, Json(UserResponse::from(user))))
}

/// DELETE /api/v1/auth_session/logout - Destroy the session named by the cookie
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let session = session_strategy(&state)?;
    let ctx = HttpRequestContext::new(LOGOUT_PATH, &headers, &jar);
    if !session.destroy_session(&ctx).await {
        return Err(ApiError::not_found());
    }

    let jar = match session.cookie_name() {
        Some(name) => jar.remove(Cookie::build(name.to_string()).path("/")),
        None => jar,
    };
    Ok((jar, Json(serde_json::json!({}))))
}
