//! Shared application state for the API server

use ledger_orchestrator::TransactionCoordinator;
use std::sync::Arc;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<TransactionCoordinator>,
}

impl AppState {
    pub fn new(coordinator: TransactionCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }
}
