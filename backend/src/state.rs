use std::sync::Arc;

use crate::orchestrator::Orchestrator;
use crate::store::DirectoryStore;

/// Shared by every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub directory: Arc<dyn DirectoryStore>,
    /// Largest attachment payload accepted, in bytes.
    pub max_upload_bytes: usize,
}
