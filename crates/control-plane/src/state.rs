// Shared application state

use std::sync::Arc;

use gatehouse_core::{AuthConfig, AuthStrategy, SessionLoginService, UserDirectory};

/// App state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub auth_config: Arc<AuthConfig>,
    /// Active strategy; `None` when AUTH_TYPE selects no gate
    pub strategy: Option<Arc<dyn AuthStrategy>>,
    pub directory: Arc<dyn UserDirectory>,
    pub login: SessionLoginService,
}

impl AppState {
    pub fn new(
        auth_config: AuthConfig,
        strategy: Option<Arc<dyn AuthStrategy>>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
            strategy,
            login: SessionLoginService::new(directory.clone()),
            directory,
        }
    }
}
