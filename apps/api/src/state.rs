use std::sync::Arc;

use crate::pipeline::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless between runs; each request gets its own pipeline state.
    pub evaluator: Arc<Evaluator>,
}
