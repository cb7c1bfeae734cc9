//! Follow-up workflow: compose a notice, render it to audio, report the outcome.
//!
//! - `FollowUpOrchestrator` runs one report through composer then renderer
//! - `FollowUpDispatcher` runs the orchestrator as a detached task per report
//! - `OutcomeSink` is the only place a finished `FollowUpOutcome` goes

mod dispatcher;
mod orchestrator;
mod sink;

pub use dispatcher::FollowUpDispatcher;
pub use orchestrator::FollowUpOrchestrator;
pub use sink::{ChannelSink, OutcomeSink, TracingSink};
