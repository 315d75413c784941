//! In-memory engine replaying scripted invocations, used by the test suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::engine::{noop_sink, Engine, LogRecord, LogSink, END_SENTINEL};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail(i32),
    /// Store outputs and emit the script, then never settle
    Hang,
}

pub struct Script {
    needle: String,
    logs: Vec<LogRecord>,
    writes: Vec<(String, Vec<u8>)>,
    late_writes: Vec<(String, Vec<u8>)>,
    requires: Vec<String>,
    outcome: Outcome,
}

impl Script {
    /// Script for invocations with an argument containing `needle`
    pub fn matching(needle: &str) -> Self {
        Self {
            needle: needle.to_string(),
            logs: Vec::new(),
            writes: Vec::new(),
            late_writes: Vec::new(),
            requires: Vec::new(),
            outcome: Outcome::Succeed,
        }
    }

    pub fn log(mut self, record: LogRecord) -> Self {
        self.logs.push(record);
        self
    }

    pub fn writes(mut self, name: &str, data: &[u8]) -> Self {
        self.writes.push((name.to_string(), data.to_vec()));
        self
    }

    /// Output that only lands in storage after every log record was emitted
    pub fn writes_late(mut self, name: &str, data: &[u8]) -> Self {
        self.late_writes.push((name.to_string(), data.to_vec()));
        self
    }

    /// Storage file that must exist when the invocation starts
    pub fn requires(mut self, name: &str) -> Self {
        self.requires.push(name.to_string());
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    fn matches(&self, args: &[String]) -> bool {
        args.iter().any(|arg| arg.contains(&self.needle))
    }
}

pub struct ScriptedEngine {
    loaded: AtomicBool,
    fail_load: bool,
    sink: Mutex<LogSink>,
    storage: Mutex<HashMap<String, Vec<u8>>>,
    scripts: Vec<Script>,
    events: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            loaded: AtomicBool::new(false),
            fail_load: false,
            sink: Mutex::new(noop_sink()),
            storage: Mutex::new(HashMap::new()),
            scripts: Vec::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn loaded(self) -> Self {
        self.loaded.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn with_file(self, name: &str, data: &[u8]) -> Self {
        self.storage.lock().unwrap().insert(name.to_string(), data.to_vec());
        self
    }

    /// Everything the engine was asked to do, in order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.storage.lock().unwrap().contains_key(name)
    }

    /// Deliver a record to whichever sink is installed right now
    pub fn emit(&self, record: LogRecord) {
        let sink = self.sink.lock().unwrap().clone();
        sink(record);
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn load(&self) -> Result<()> {
        self.record("load".to_string());
        if self.fail_load {
            return Err(EngineError::LoadFailed { reason: "scripted".to_string() }.into());
        }
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn set_logger(&self, sink: LogSink) {
        *self.sink.lock().unwrap() = sink;
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        if !self.is_loaded() {
            return Err(EngineError::NotLoaded.into());
        }
        let joined = args.join(" ");
        self.record(format!("run {}", joined));

        let Some(script) = self.scripts.iter().find(|s| s.matches(args)) else {
            self.emit(LogRecord::out(END_SENTINEL));
            self.record(format!("done {}", joined));
            return Ok(());
        };

        for name in &script.requires {
            if !self.has_file(name) {
                self.emit(LogRecord::err(format!("{}: No such file or directory", name)));
                self.emit(LogRecord::out(END_SENTINEL));
                return Err(EngineError::RunFailed { args: joined, code: Some(1) }.into());
            }
        }

        // Outputs land in storage as the invocation progresses
        if !matches!(script.outcome, Outcome::Fail(_)) {
            let mut storage = self.storage.lock().unwrap();
            for (name, data) in &script.writes {
                storage.insert(name.clone(), data.clone());
            }
        }

        for record in &script.logs {
            self.emit(record.clone());
            tokio::task::yield_now().await;
        }

        if !matches!(script.outcome, Outcome::Fail(_)) {
            let mut storage = self.storage.lock().unwrap();
            for (name, data) in &script.late_writes {
                storage.insert(name.clone(), data.clone());
            }
        }

        if let Outcome::Fail(code) = script.outcome {
            self.emit(LogRecord::out(END_SENTINEL));
            self.record(format!("failed {}", joined));
            return Err(EngineError::RunFailed { args: joined, code: Some(code) }.into());
        }

        if script.outcome == Outcome::Hang {
            self.record(format!("hung {}", joined));
            std::future::pending::<()>().await;
        }

        self.emit(LogRecord::out(END_SENTINEL));
        self.record(format!("done {}", joined));
        Ok(())
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        self.record(format!("write {}", name));
        self.storage.lock().unwrap().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.record(format!("read {}", name));
        self.storage
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::FileNotFound { name: name.to_string() }.into())
    }

    fn unlink(&self, name: &str) -> Result<()> {
        self.record(format!("unlink {}", name));
        self.storage
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::FileNotFound { name: name.to_string() }.into())
    }
}
