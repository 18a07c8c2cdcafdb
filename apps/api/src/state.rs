use std::sync::Arc;

use tokio::sync::Mutex;

use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::matching::orchestrator::{MatchRequestOrchestrator, MatchService};
use crate::skills::draft::JobDraft;
use crate::workflow::controller::MatchWorkflowController;
use crate::workflow::notice::NoticeSlot;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    /// Fans match requests out to the pluggable matcher. Default: `BackendClient`.
    pub orchestrator: MatchRequestOrchestrator,
    /// Single writer for mode, queued inputs, navigation and results.
    pub workflow: Arc<Mutex<MatchWorkflowController>>,
    /// The job being defined or edited, if any.
    pub draft: Arc<Mutex<Option<JobDraft>>>,
    pub notices: Arc<Mutex<NoticeSlot>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, backend: BackendClient, matcher: Arc<dyn MatchService>) -> Self {
        Self {
            backend,
            orchestrator: MatchRequestOrchestrator::new(matcher),
            workflow: Arc::new(Mutex::new(MatchWorkflowController::new())),
            draft: Arc::new(Mutex::new(None)),
            notices: Arc::new(Mutex::new(NoticeSlot::default())),
            config,
        }
    }
}
