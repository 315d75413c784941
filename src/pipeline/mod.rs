//! # Showcase Pipeline
//!
//! Runs the whole showcase as an explicit, strictly ordered list of steps:
//! load the engine, stage the sample input, then run each feature hook.
//! The engine accepts only one invocation at a time, so every step is fully
//! awaited before the next one starts.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, PipelineReport, Step, StepReport, StepStatus};
