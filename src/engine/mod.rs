//! # Engine Module
//!
//! The narrow interface to the external transcoding engine. The showcase never
//! transcodes anything itself: it loads the engine, stages files into the
//! engine's storage, issues invocations and reads results back out.
//!
//! Log output of an invocation is delivered record by record to whichever
//! [`LogSink`] is currently installed with [`Engine::set_logger`]. There is
//! exactly one active sink per engine.

pub mod process;

#[cfg(test)]
pub(crate) mod scripted;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use process::ProcessEngine;

/// Literal record the engine emits once an invocation has finished
pub const END_SENTINEL: &str = "FFMPEG_END";

/// Output channel a log record was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Out,
    Err,
}

/// One line of diagnostic output from an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub channel: Channel,
    pub message: String,
}

impl LogRecord {
    pub fn out<S: Into<String>>(message: S) -> Self {
        Self { channel: Channel::Out, message: message.into() }
    }

    pub fn err<S: Into<String>>(message: S) -> Self {
        Self { channel: Channel::Err, message: message.into() }
    }
}

/// Process-wide receiver of an engine's log records
pub type LogSink = Arc<dyn Fn(LogRecord) + Send + Sync>;

/// A sink that drops every record
pub fn noop_sink() -> LogSink {
    Arc::new(|_| {})
}

/// The external transcoding engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Prepare the engine; resolves once it can accept invocations
    async fn load(&self) -> Result<()>;

    /// Whether [`Engine::load`] has completed
    fn is_loaded(&self) -> bool;

    /// Install the sink receiving all subsequent log records
    fn set_logger(&self, sink: LogSink);

    /// Issue one invocation with command-line style arguments
    ///
    /// Only one invocation may be in flight at a time; overlapping calls
    /// would interleave their records into the same sink.
    async fn run(&self, args: &[String]) -> Result<()>;

    /// Write `data` into engine storage under `name`
    fn write_file(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Read the file stored under `name`
    fn read_file(&self, name: &str) -> Result<Vec<u8>>;

    /// Remove the file stored under `name`
    fn unlink(&self, name: &str) -> Result<()>;
}
