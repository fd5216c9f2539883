// Plain gate: exemptions apply, no principal is ever resolved

use async_trait::async_trait;

use super::AuthStrategy;
use crate::config::AuthMode;
use crate::gate::PathGate;
use crate::principal::Principal;
use crate::request::RequestContext;

#[derive(Debug, Clone)]
pub struct GateOnlyStrategy {
    gate: PathGate,
}

impl GateOnlyStrategy {
    pub fn new(gate: PathGate) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl AuthStrategy for GateOnlyStrategy {
    fn kind(&self) -> AuthMode {
        AuthMode::Auth
    }

    fn gate(&self) -> &PathGate {
        &self.gate
    }

    async fn resolve_principal(&self, _request: &dyn RequestContext) -> Option<Principal> {
        None
    }
}
