use std::sync::Arc;

use tracing::{debug, Instrument};

use super::orchestrator::FollowUpOrchestrator;
use super::sink::OutcomeSink;
use crate::report::DebtReport;

/// Fire-and-forget runner for follow-ups.
///
/// Each dispatched report gets its own detached tokio task: no join handle is
/// kept, nothing is cancelled, and the outcome only reaches the sink.
#[derive(Clone)]
pub struct FollowUpDispatcher {
    orchestrator: Arc<FollowUpOrchestrator>,
    sink: Arc<dyn OutcomeSink>,
}

impl FollowUpDispatcher {
    pub fn new(orchestrator: Arc<FollowUpOrchestrator>, sink: Arc<dyn OutcomeSink>) -> Self {
        Self { orchestrator, sink }
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, report: DebtReport) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let sink = Arc::clone(&self.sink);
        let span = tracing::info_span!("followup", employee = %report.employee_name);

        debug!(target: "followup", "Dispatching background follow-up");
        tokio::spawn(
            async move {
                let outcome = orchestrator.run_followup(&report).await;
                sink.deliver(outcome).await;
            }
            .instrument(span),
        );
    }
}
