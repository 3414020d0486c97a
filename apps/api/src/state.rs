use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion capability. `LlmClient` in production, a scripted double in tests.
    pub gateway: Arc<dyn CompletionGateway>,
    pub config: Config,
}
