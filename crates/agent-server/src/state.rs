//! Application State

use std::sync::Arc;

use agent_core::Agent;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Agent with the scanner tools and per-user histories
    pub agent: Arc<Agent>,

    /// Whether a backend URL was configured at startup
    pub backend_configured: bool,
}

impl AppState {
    pub fn new(agent: Agent, backend_configured: bool) -> Self {
        Self {
            agent: Arc::new(agent),
            backend_configured,
        }
    }
}
