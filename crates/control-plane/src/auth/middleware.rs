// Authentication gate and extractors
// Decision: One middleware consults the configured strategy for every /api/v1 route
// Decision: No credentials at all is 401; credentials that resolve to nobody is 403

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use gatehouse_core::{Principal, RequestContext};

use crate::api::common::ApiError;
use crate::state::AppState;

/// Request view handed to strategies
pub struct HttpRequestContext<'a> {
    path: &'a str,
    headers: &'a HeaderMap,
    jar: &'a CookieJar,
}

impl<'a> HttpRequestContext<'a> {
    pub fn new(path: &'a str, headers: &'a HeaderMap, jar: &'a CookieJar) -> Self {
        Self { path, headers, jar }
    }
}

impl RequestContext for HttpRequestContext<'_> {
    fn path(&self) -> Option<&str> {
        Some(self.path)
    }

    fn authorization_header(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(|cookie| cookie.value())
    }
}

/// Principal attached by the gate
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

/// Extractor for the authenticated principal; 403 when the gate attached none
#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(ApiError::forbidden)
    }
}

/// Gate middleware, installed with `middleware::from_fn_with_state`
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(strategy) = state.strategy.clone() else {
        return Ok(next.run(request).await);
    };

    let path = request.uri().path().to_string();
    if !strategy.requires_auth(Some(&path)) {
        return Ok(next.run(request).await);
    }

    let principal = {
        let ctx = HttpRequestContext::new(&path, request.headers(), &jar);
        let has_header = strategy.authorization_header(&ctx).is_some();
        let has_cookie = strategy
            .as_session()
            .and_then(|session| session.session_cookie(&ctx))
            .is_some();
        if !has_header && !has_cookie {
            tracing::debug!(path = %path, "Rejected request without credentials");
            return Err(ApiError::unauthorized());
        }

        strategy.resolve_principal(&ctx).await.ok_or_else(|| {
            tracing::debug!(path = %path, "Credentials did not resolve to a user");
            ApiError::forbidden()
        })?
    };

    request.extensions_mut().insert(CurrentUser(principal));
    Ok(next.run(request).await)
}
