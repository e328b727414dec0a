//! Shared, read-only application state.

use crate::orchestrator::DataOrchestrator;

pub(crate) struct AppState {
    pub(crate) orchestrator: DataOrchestrator,
}

impl AppState {
    pub(crate) fn new(orchestrator: DataOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub(crate) fn model_configured(&self) -> bool {
        self.orchestrator.gateway().is_configured()
    }
}
