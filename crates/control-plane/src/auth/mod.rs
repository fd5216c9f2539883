// Authentication module: the gate middleware and the session login routes

pub mod middleware;
pub mod routes;

pub use middleware::{require_auth, CurrentUser, HttpRequestContext};
pub use routes::routes;
