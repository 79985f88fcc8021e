use std::sync::Arc;

use crate::llm_client::LlmProvider;
use crate::sessions::repository::SessionRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `LlmClient` in production, a scripted double in tests.
    pub llm: Arc<dyn LlmProvider>,
    pub sessions: SessionRepository,
}
