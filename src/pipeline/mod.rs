//! The pipeline: one explicit state struct and the orchestrator that owns it.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{Orchestrator, Providers};
pub use state::PipelineState;
