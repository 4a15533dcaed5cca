use std::sync::Arc;

use runq_core::JobService;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<JobService>,
}

impl AppState {
    pub fn new(service: Arc<JobService>) -> Self {
        Self { service }
    }
}
