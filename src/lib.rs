//! # ffmpeg-showcase
//!
//! Drive ffmpeg through a small set of showcase features and collect their
//! results: help, version and license text, a thumbnail, the audio track,
//! an animated GIF and a resized video.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ffmpeg_showcase::{
//!     config::Config,
//!     engine::ProcessEngine,
//!     pipeline::Orchestrator,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.demo.input = Some("sample.mp4".into());
//!
//! let engine = Arc::new(ProcessEngine::from_config(&config.engine));
//! let orchestrator = Orchestrator::new(engine, config.demo);
//! let board = orchestrator.board();
//!
//! orchestrator.run(&board).await?;
//! println!("{}", board.render(false));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`engine`] - The ffmpeg engine seam and its process-backed implementation
//! - [`runner`] - Log classification and serialized invocations
//! - [`hooks`] - One orchestration recipe per showcased feature
//! - [`pipeline`] - Ordered load, stage and feature steps
//! - [`presentation`] - Per-feature result slots and the text board
//! - [`config`] - Configuration management
//!
//! ## Custom Hooks
//!
//! A feature's recipe can be replaced by registering another
//! [`OperationHook`](hooks::OperationHook):
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use ffmpeg_showcase::hooks::{Feature, HookContext, OperationHook};
//! use ffmpeg_showcase::runner::RunOptions;
//! use ffmpeg_showcase::Result;
//!
//! struct ShortVersion;
//!
//! #[async_trait]
//! impl OperationHook for ShortVersion {
//!     fn feature(&self) -> Feature {
//!         Feature::Version
//!     }
//!
//!     async fn run(&self, ctx: &HookContext<'_>) -> Result<()> {
//!         let result = ctx.invoker.invoke(["-version"], RunOptions::default()).await?;
//!         let first = result.out_lines.first().cloned().unwrap_or_default();
//!         ctx.slot.set_text(first);
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod presentation;
pub mod runner;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    engine::{Engine, ProcessEngine},
    error::{Result, ShowcaseError},
    hooks::{Feature, HookRegistry, OperationHook},
    pipeline::{Orchestrator, PipelineReport},
    presentation::FeatureBoard,
    runner::{LogClassifier, RunInvoker, RunResult},
};
