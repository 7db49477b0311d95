use std::sync::Arc;

use crate::config::Config;
use crate::optimizer::pipeline::Optimizer;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence. Default: InMemoryStore; a database-backed
    /// implementation plugs in behind the same trait.
    pub store: Arc<dyn ResumeStore>,
    pub optimizer: Arc<Optimizer>,
    /// Loaded once at startup; handlers read runtime settings from here.
    #[allow(dead_code)]
    pub config: Config,
}
