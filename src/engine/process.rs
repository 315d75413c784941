use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{is_plain_file_name, EngineConfig};
use crate::engine::{noop_sink, Channel, Engine, LogRecord, LogSink, END_SENTINEL};
use crate::error::{EngineError, Result};

/// Engine backed by the system ffmpeg binary
///
/// Every invocation runs as a child process whose working directory is a
/// private scratch directory; that directory is the engine's storage
/// namespace. stdout and stderr are split into lines and forwarded to the
/// active sink, and each invocation ends with an [`END_SENTINEL`] record.
pub struct ProcessEngine {
    program: PathBuf,
    scratch_root: Option<PathBuf>,
    scratch: Mutex<Option<TempDir>>,
    sink: Mutex<LogSink>,
}

impl ProcessEngine {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            scratch_root: None,
            scratch: Mutex::new(None),
            sink: Mutex::new(noop_sink()),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new(config.ffmpeg_path.clone());
        engine.scratch_root = config.scratch_root.clone();
        engine
    }

    /// Location of the storage namespace, once loaded
    pub fn scratch_path(&self) -> Option<PathBuf> {
        lock(&self.scratch).as_ref().map(|dir| dir.path().to_path_buf())
    }

    async fn verify_binary(&self) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| EngineError::LoadFailed {
                reason: format!("{}: {}", self.program.display(), e),
            })?;

        if !status.success() {
            return Err(EngineError::LoadFailed {
                reason: format!("{} -version exited with {}", self.program.display(), status),
            }.into());
        }
        Ok(())
    }

    fn open_scratch(&self) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ffmpeg-showcase-");
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| EngineError::LoadFailed {
            reason: format!("could not create scratch storage: {}", e),
        })?;

        let path = dir.path().to_path_buf();
        *lock(&self.scratch) = Some(dir);
        Ok(path)
    }

    fn scratch_dir(&self) -> Result<PathBuf> {
        self.scratch_path().ok_or_else(|| EngineError::NotLoaded.into())
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(EngineError::InvalidName { name: name.to_string() }.into());
        }
        Ok(self.scratch_dir()?.join(name))
    }

    fn emit(&self, record: LogRecord) {
        // Clone out of the lock so a sink may replace itself
        let sink = lock(&self.sink).clone();
        sink(record);
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn load(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }

        self.verify_binary().await?;
        let path = self.open_scratch()?;
        info!("Engine ready: {} (storage at {:?})", self.program.display(), path);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        lock(&self.scratch).is_some()
    }

    fn set_logger(&self, sink: LogSink) {
        *lock(&self.sink) = sink;
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        let dir = self.scratch_dir()?;
        let joined = args.join(" ");
        debug!("Invoking {} {}", self.program.display(), joined);

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::SpawnFailed {
                program: self.program.display().to_string(),
                reason: e.to_string(),
            })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                return Err(EngineError::SpawnFailed {
                    program: self.program.display().to_string(),
                    reason: "output streams were not captured".to_string(),
                }.into())
            }
        };

        let emit = |record: LogRecord| self.emit(record);
        tokio::try_join!(
            pump_lines(stdout, Channel::Out, &emit),
            pump_lines(stderr, Channel::Err, &emit)
        )?;

        let status = child.wait().await?;
        self.emit(LogRecord::out(END_SENTINEL));

        if !status.success() {
            return Err(EngineError::RunFailed { args: joined, code: status.code() }.into());
        }
        Ok(())
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(name)?;
        std::fs::write(&path, data).map_err(|e| storage_error(name, e))?;
        debug!("Stored {} ({} bytes)", name, data.len());
        Ok(())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        std::fs::read(&path).map_err(|e| storage_error(name, e))
    }

    fn unlink(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        std::fs::remove_file(&path).map_err(|e| storage_error(name, e))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn storage_error(name: &str, err: std::io::Error) -> crate::error::ShowcaseError {
    if err.kind() == std::io::ErrorKind::NotFound {
        EngineError::FileNotFound { name: name.to_string() }.into()
    } else {
        EngineError::Storage { name: name.to_string(), reason: err.to_string() }.into()
    }
}

/// Forward every line of `reader` to `emit` as records on `channel`
async fn pump_lines<R, F>(reader: R, channel: Channel, emit: &F) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    F: Fn(LogRecord),
{
    let mut reader = BufReader::new(reader);
    let mut splitter = LineSplitter::default();

    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            break;
        }
        let consumed = chunk.len();
        for message in splitter.push(chunk) {
            emit(LogRecord { channel, message });
        }
        reader.consume(consumed);
    }

    if let Some(message) = splitter.finish() {
        emit(LogRecord { channel, message });
    }
    Ok(())
}

/// Splits a byte stream into lines on `\n`, `\r\n` and `\r`
///
/// ffmpeg rewrites its progress line in place with a bare `\r`; empty pieces
/// between carriage returns are dropped. Blank `\n`-terminated lines are
/// kept so paragraphed output (help, license) keeps its layout. Trailing
/// whitespace is trimmed.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
    /// Set right after a `\r`; true when that `\r` closed a non-empty line
    after_cr: Option<bool>,
}

impl LineSplitter {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            let after_cr = self.after_cr.take();
            match (byte, after_cr) {
                // `\r\n` closing a line already emitted at the `\r`
                (b'\n', Some(true)) => {}
                (b'\n', _) => lines.push(self.take()),
                (b'\r', _) => {
                    let line = self.take();
                    self.after_cr = Some(!line.is_empty());
                    if !line.is_empty() {
                        lines.push(line);
                    }
                }
                _ => self.pending.push(byte),
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        self.after_cr = None;
        let line = self.take();
        (!line.is_empty()).then_some(line)
    }

    fn take(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).trim_end().to_string();
        self.pending.clear();
        line
    }
}

impl std::fmt::Debug for ProcessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessEngine")
            .field("program", &self.program)
            .field("scratch", &self.scratch_path())
            .finish()
    }
}
