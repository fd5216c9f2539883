//! Router-level flows for every authentication mode.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use gatehouse_control_plane::{build_app, into_service, AppState};
use gatehouse_core::memory::InMemoryUserDirectory;
use gatehouse_core::{
    build_strategy, hash_password, AuthConfig, AuthMode, Principal, SessionTable, StrategyDeps,
    UserDirectory,
};
use gatehouse_storage::FileSessionStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const COOKIE: &str = "_my_session_id";
const EMAIL: &str = "bob@hbtn.io";
const PASSWORD: &str = "H0lbertonSchool98!";

struct TestApp {
    router: Router,
    directory: Arc<InMemoryUserDirectory>,
    bob: Principal,
}

async fn app_with(mode: AuthMode, deps: impl FnOnce(StrategyDeps) -> StrategyDeps) -> TestApp {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let mut bob = Principal::new(EMAIL, hash_password(PASSWORD).unwrap());
    bob.first_name = Some("Bob".into());
    directory.save(&bob).await.unwrap();

    let config = AuthConfig {
        mode,
        session_cookie_name: Some(COOKIE.to_string()),
        ..AuthConfig::default()
    };
    let strategy = build_strategy(&config, deps(StrategyDeps::new(directory.clone()))).unwrap();
    let state = AppState::new(config, strategy, directory.clone());

    TestApp {
        router: build_app(state),
        directory,
        bob,
    }
}

async fn app(mode: AuthMode) -> TestApp {
    app_with(mode, |deps| deps).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_header(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

fn form(method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn basic(credentials: &str) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    format!("Basic {}", STANDARD.encode(credentials))
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` from the first Set-Cookie header for `name`
fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
}

// ============================================
// Status routes and no-gate mode
// ============================================

#[tokio::test]
async fn test_status_and_stats_without_gate() {
    let app = app(AuthMode::None).await;

    let response = send(&app.router, get("/api/v1/status")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "OK"}));

    let response = send(&app.router, get("/api/v1/stats")).await;
    assert_eq!(body_json(response).await, serde_json::json!({"users": 1}));

    let response = send(&app.router, get("/api/v1/unauthorized")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, serde_json::json!({"error": "Unauthorized"}));

    let response = send(&app.router, get("/api/v1/forbidden")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app.router, get("/api/v1/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, serde_json::json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_users_crud() {
    let app = app(AuthMode::None).await;

    let response = send(&app.router, json_request("POST", "/api/v1/users", "not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Wrong format");

    let response = send(
        &app.router,
        json_request("POST", "/api/v1/users", r#"{"password": "pwd"}"#),
    )
    .await;
    assert_eq!(body_json(response).await["error"], "email missing");

    let response = send(
        &app.router,
        json_request("POST", "/api/v1/users", r#"{"email": "alice@hbtn.io"}"#),
    )
    .await;
    assert_eq!(body_json(response).await["error"], "password missing");

    let response = send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/users",
            r#"{"email": "alice@hbtn.io", "password": "pwd", "last_name": "Liddell"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["email"], "alice@hbtn.io");
    assert!(created.get("password_hash").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let response = send(
        &app.router,
        json_request("PUT", &format!("/api/v1/users/{}", id), r#"{"first_name": "Alice"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["display_name"], "Alice Liddell");

    let response = send(&app.router, get("/api/v1/users")).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/users/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, delete).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.directory.count().await.unwrap(), 1);

    let response = send(&app.router, get(&format!("/api/v1/users/{}", id))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&app.router, get("/api/v1/users/not-a-uuid")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    // no gate, so nobody is attached
    let response = send(&app.router, get("/api/v1/users/me")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================
// Gate modes
// ============================================

#[tokio::test]
async fn test_gate_only_mode_forbids_any_credentials() {
    let app = app(AuthMode::Auth).await;

    let response = send(&app.router, get("/api/v1/status")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app.router, get("/api/v1/users")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app.router,
        with_header("/api/v1/users", header::AUTHORIZATION, &basic(&format!("{EMAIL}:{PASSWORD}"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_basic_auth_gate() {
    let app = app(AuthMode::Basic).await;

    let response = send(&app.router, get("/api/v1/users")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app.router,
        with_header("/api/v1/users", header::AUTHORIZATION, &basic(&format!("{EMAIL}:wrong"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, serde_json::json!({"error": "Forbidden"}));

    let response = send(
        &app.router,
        with_header("/api/v1/users", header::AUTHORIZATION, "Basic bm9zZW1pY29sb24="),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app.router,
        with_header(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &basic(&format!("{EMAIL}:{PASSWORD}")),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["email"], EMAIL);
    assert_eq!(me["id"], app.bob.id.to_string());
}

#[tokio::test]
async fn test_trailing_slash_is_normalized() {
    let app = app(AuthMode::Basic).await;

    for uri in ["/api/v1/status", "/api/v1/status/"] {
        let response = into_service(app.router.clone()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = into_service(app.router.clone())
        .oneshot(get("/api/v1/users/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================
// Session login routes
// ============================================

async fn login(app: &TestApp) -> String {
    let response = send(
        &app.router,
        form(
            "POST",
            "/api/v1/auth_session/login",
            &format!("email={EMAIL}&password={PASSWORD}"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response, COOKIE).unwrap();
    let user = body_json(response).await;
    assert_eq!(user["email"], EMAIL);
    cookie
}

#[tokio::test]
async fn test_session_login_errors() {
    let app = app(AuthMode::Session).await;
    let cases = [
        ("password=x", StatusCode::BAD_REQUEST, "email missing"),
        ("email=bob@hbtn.io", StatusCode::BAD_REQUEST, "password missing"),
        (
            "email=nobody@hbtn.io&password=x",
            StatusCode::NOT_FOUND,
            "no user found for this email",
        ),
        ("email=bob@hbtn.io&password=x", StatusCode::UNAUTHORIZED, "wrong password"),
    ];

    for (body, status, error) in cases {
        let response = send(
            &app.router,
            form("POST", "/api/v1/auth_session/login", body, None),
        )
        .await;
        assert_eq!(response.status(), status, "{body}");
        assert_eq!(body_json(response).await["error"], error);
    }
}

#[tokio::test]
async fn test_session_login_me_logout() {
    let app = app(AuthMode::Session).await;
    let cookie = login(&app).await;

    let response = send(&app.router, with_header("/api/v1/users/me", header::COOKIE, &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], app.bob.id.to_string());

    let response = send(
        &app.router,
        form("DELETE", "/api/v1/auth_session/logout", "", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({}));

    // the cookie still arrives but names no session
    let response = send(&app.router, with_header("/api/v1/users/me", header::COOKIE, &cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_session_login_unavailable_without_sessions() {
    let app = app(AuthMode::Basic).await;
    let response = send(
        &app.router,
        form(
            "POST",
            "/api/v1/auth_session/login",
            &format!("email={EMAIL}&password={PASSWORD}"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_login_unavailable_without_cookie_name() {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let bob = Principal::new(EMAIL, hash_password(PASSWORD).unwrap());
    directory.save(&bob).await.unwrap();

    let config = AuthConfig {
        mode: AuthMode::Session,
        ..AuthConfig::default()
    };
    let sessions = Arc::new(SessionTable::new());
    let deps = StrategyDeps::new(directory.clone());
    let deps = StrategyDeps {
        sessions: sessions.clone(),
        ..deps
    };
    let strategy = build_strategy(&config, deps).unwrap();
    let router = build_app(AppState::new(config, strategy, directory));

    let response = send(
        &router,
        form(
            "POST",
            "/api/v1/auth_session/login",
            &format!("email={EMAIL}&password={PASSWORD}"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_persisted_sessions_use_the_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sessions.json");
    let store = Arc::new(FileSessionStore::open(&path).await.unwrap());
    let app = app_with(AuthMode::SessionDb, |deps| deps.with_session_backend(store)).await;

    let cookie = login(&app).await;
    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(on_disk.contains(&app.bob.id.to_string()));

    let response = send(&app.router, with_header("/api/v1/users/me", header::COOKIE, &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app.router,
        form("DELETE", "/api/v1/auth_session/logout", "", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!std::fs::read_to_string(&path)
        .unwrap()
        .contains(&app.bob.id.to_string()));
}

// ============================================
// Standalone account routes
// ============================================

#[tokio::test]
async fn test_account_flow() {
    let app = app(AuthMode::None).await;

    let response = send(&app.router, get("/")).await;
    assert_eq!(body_json(response).await, serde_json::json!({"message": "Bienvenue"}));

    let response = send(
        &app.router,
        form("POST", "/users", "email=guillaume@holberton.io&password=b4l0u", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"email": "guillaume@holberton.io", "message": "user created"})
    );

    let response = send(
        &app.router,
        form("POST", "/users", "email=guillaume@holberton.io&password=b4l0u", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "email already registered"})
    );

    let response = send(
        &app.router,
        form("POST", "/sessions", "email=guillaume@holberton.io&password=nope", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app.router,
        form("POST", "/sessions", "email=guillaume@holberton.io&password=b4l0u", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response, "session_id").unwrap();

    let response = send(&app.router, with_header("/profile", header::COOKIE, &cookie)).await;
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"email": "guillaume@holberton.io"})
    );

    let response = send(&app.router, form("DELETE", "/sessions", "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = send(&app.router, with_header("/profile", header::COOKIE, &cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(&app.router, form("DELETE", "/sessions", "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = app(AuthMode::None).await;

    let response = send(
        &app.router,
        form("POST", "/reset_password", "email=nobody@hbtn.io", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app.router,
        form("POST", "/reset_password", &format!("email={EMAIL}"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["reset_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &app.router,
        form(
            "PUT",
            "/reset_password",
            &format!("email={EMAIL}&reset_token=bogus&new_password=NewPwd"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app.router,
        form(
            "PUT",
            "/reset_password",
            &format!("email={EMAIL}&reset_token={token}&new_password=NewPwd"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Password updated");

    let response = send(
        &app.router,
        form("POST", "/sessions", &format!("email={EMAIL}&password={PASSWORD}"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app.router,
        form("POST", "/sessions", &format!("email={EMAIL}&password=NewPwd"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
