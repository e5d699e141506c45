//! Shared application state for the gateway server.

use inference::{Backend, Orchestrator, Registry};

/// Shared state available to all request handlers.
pub struct AppState<B: Backend> {
    /// Orchestrator over the startup-resolved registry (immutable after init).
    pub orchestrator: Orchestrator<B>,
}

impl<B: Backend> AppState<B> {
    pub fn new(registry: Registry<B>) -> Self {
        Self {
            orchestrator: Orchestrator::new(registry),
        }
    }
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
        }
    }
}
