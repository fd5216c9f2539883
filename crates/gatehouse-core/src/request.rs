// Request boundary consumed by strategies
// Decision: Strategies see a narrow view (path, Authorization header, cookies),
// so the HTTP framework stays out of this crate

use std::collections::HashMap;

/// What a strategy may read from an inbound request
pub trait RequestContext: Send + Sync {
    /// Request path, if known
    fn path(&self) -> Option<&str>;

    /// Raw `Authorization` header value
    fn authorization_header(&self) -> Option<&str>;

    /// Cookie value by name
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Owned request view for callers without an HTTP framework, and for tests
#[derive(Debug, Clone, Default)]
pub struct SimpleRequest {
    pub path: Option<String>,
    pub authorization: Option<String>,
    pub cookies: HashMap<String, String>,
}

impl SimpleRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl RequestContext for SimpleRequest {
    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn authorization_header(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}
