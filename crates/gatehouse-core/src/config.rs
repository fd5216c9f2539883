// Authentication configuration loaded from environment variables.
// Decision: Resolve every auth setting once at startup and pass it into constructors
// Decision: Default to "none" mode so a bare process serves without a gate

use chrono::Duration;

/// Paths that bypass authentication unless `AUTH_EXCLUDED_PATHS` overrides them
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    "/api/v1/status/",
    "/api/v1/unauthorized/",
    "/api/v1/forbidden/",
    "/api/v1/auth_session/login/",
];

/// Authentication mode selected by `AUTH_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No gate at all
    #[default]
    None,
    /// Gate only; never resolves a principal
    Auth,
    /// HTTP Basic credentials checked against the user directory
    Basic,
    /// Opaque session cookie, in-memory table
    Session,
    /// Session cookie with a time-to-live
    SessionExp,
    /// Session cookie with a time-to-live, backed by a durable store
    SessionDb,
}

impl AuthMode {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "auth" => AuthMode::Auth,
            "basic_auth" => AuthMode::Basic,
            "session_auth" => AuthMode::Session,
            "session_exp_auth" => AuthMode::SessionExp,
            "session_db_auth" => AuthMode::SessionDb,
            _ => AuthMode::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::Auth => "auth",
            AuthMode::Basic => "basic_auth",
            AuthMode::Session => "session_auth",
            AuthMode::SessionExp => "session_exp_auth",
            AuthMode::SessionDb => "session_db_auth",
        }
    }

    /// Whether this mode issues session cookies
    pub fn uses_sessions(&self) -> bool {
        matches!(
            self,
            AuthMode::Session | AuthMode::SessionExp | AuthMode::SessionDb
        )
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Active strategy
    pub mode: AuthMode,
    /// Cookie carrying the session token. No default: unset means no cookie is ever found.
    pub session_cookie_name: Option<String>,
    /// Session lifetime in seconds; zero or negative never expires
    pub session_duration_secs: i64,
    /// Exemption patterns for the path gate
    pub excluded_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::None,
            session_cookie_name: None,
            session_duration_secs: 0,
            excluded_paths: DEFAULT_EXCLUDED_PATHS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// - `AUTH_TYPE`: `auth`, `basic_auth`, `session_auth`, `session_exp_auth`, `session_db_auth`
    /// - `SESSION_NAME`: session cookie name
    /// - `SESSION_DURATION`: session TTL in seconds
    /// - `AUTH_EXCLUDED_PATHS`: comma separated exemption patterns
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = get("AUTH_TYPE")
            .map(|s| AuthMode::from_str(&s))
            .unwrap_or_default();

        let session_cookie_name = get("SESSION_NAME").filter(|s| !s.is_empty());

        // Non-numeric or absent falls back to "never expires"
        let session_duration_secs = get("SESSION_DURATION")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0);

        let excluded_paths = get("AUTH_EXCLUDED_PATHS")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| Self::default().excluded_paths);

        Self {
            mode,
            session_cookie_name,
            session_duration_secs,
            excluded_paths,
        }
    }

    /// Session time-to-live, `None` when sessions never expire.
    /// A duration chrono cannot represent also never expires.
    pub fn session_ttl(&self) -> Option<Duration> {
        if self.session_duration_secs <= 0 {
            None
        } else {
            Duration::try_seconds(self.session_duration_secs)
        }
    }

    /// Check if a gate is installed at all
    pub fn is_enabled(&self) -> bool {
        self.mode != AuthMode::None
    }
}
