// Gatehouse API server
// Decision: AUTH_TYPE picks the strategy once at startup; no gate when unset
// Decision: No DATABASE_URL means dev mode: in-memory users, JSON-file sessions

use anyhow::{Context, Result};
use axum::extract::Request;
use gatehouse_control_plane::{build_app, into_service, telemetry, AppState, ServerConfig};
use gatehouse_core::{build_strategy, AuthConfig, AuthMode, StrategyDeps};
use gatehouse_storage::StorageBackend;
use axum::ServiceExt;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    tracing::info!("gatehouse starting...");

    let server_config = ServerConfig::from_env().context("Invalid server configuration")?;
    let auth_config = AuthConfig::from_env();
    tracing::info!(
        mode = auth_config.mode.as_str(),
        cookie = ?auth_config.session_cookie_name,
        session_duration = auth_config.session_duration_secs,
        "Authentication configured"
    );

    let storage = match &server_config.database_url {
        Some(url) => {
            let storage = StorageBackend::postgres(url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Connected to database");
            storage
        }
        None => {
            tracing::warn!("DATABASE_URL not set; users are kept in memory");
            StorageBackend::in_memory()
        }
    };

    let directory = storage.user_directory();
    let mut deps = StrategyDeps::new(directory.clone());
    if auth_config.mode == AuthMode::SessionDb {
        let backend = storage
            .session_backend(&server_config.session_store_path)
            .await
            .context("Failed to open session store")?;
        deps = deps.with_session_backend(backend);
    }
    let strategy = build_strategy(&auth_config, deps).context("Failed to build auth strategy")?;

    let state = AppState::new(auth_config, strategy, directory);
    let app = into_service(build_app(state));

    let addr = server_config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .context("Server error")?;

    Ok(())
}
