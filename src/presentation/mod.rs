//! # Presentation Module
//!
//! Per-feature display state, what is known about the sample video, and
//! their text rendering.

pub mod board;
pub mod output;
pub mod source;

pub use board::FeatureBoard;
pub use output::{FeatureOutput, FeatureSlot, MediaResult, TextResult};
pub use source::SourceInfo;
