//! Run orchestration and the event channel to the caller

pub mod context;
pub mod messages;
pub mod orchestrator;
pub mod reporter;
pub mod runner;

pub use context::RunContext;
pub use messages::{PipelineEvent, Severity, StatusMessage};
pub use orchestrator::Orchestrator;
pub use reporter::Reporter;
pub use runner::{PipelineRunner, RunHandle};
