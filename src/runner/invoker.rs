use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::engine::{noop_sink, Engine, LogRecord, LogSink};
use crate::error::Result;
use crate::runner::{LogClassifier, ProgressFn, RunResult};

/// Per-invocation options
#[derive(Default)]
pub struct RunOptions {
    on_progress: Option<ProgressFn>,
}

impl RunOptions {
    /// Receive every signal record while the invocation is in flight
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&LogRecord) + Send + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }
}

/// Holds the engine's log sink for one invocation
///
/// The sink reverts to a no-op when the guard drops, whether the invocation
/// succeeded, failed, or was abandoned mid-flight.
struct SinkGuard<'a> {
    engine: &'a dyn Engine,
}

impl<'a> SinkGuard<'a> {
    fn install(engine: &'a dyn Engine, sink: LogSink) -> Self {
        engine.set_logger(sink);
        Self { engine }
    }
}

impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        self.engine.set_logger(noop_sink());
    }
}

/// Observer of every record of every invocation, noise included
pub type LogTap = Arc<dyn Fn(&LogRecord) + Send + Sync>;

/// Serializes invocations of one engine, each with a dedicated classifier
pub struct RunInvoker {
    engine: Arc<dyn Engine>,
    gate: tokio::sync::Mutex<()>,
    tap: Mutex<Option<LogTap>>,
}

impl RunInvoker {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            gate: tokio::sync::Mutex::new(()),
            tap: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Install the tap that sees the raw records of later invocations
    pub fn set_tap(&self, tap: LogTap) {
        *self.tap.lock().unwrap_or_else(PoisonError::into_inner) = Some(tap);
    }

    /// Load the engine unless it already is; returns whether a load happened
    pub async fn ensure_loaded(&self) -> Result<bool> {
        if self.engine.is_loaded() {
            return Ok(false);
        }
        info!("Loading engine...");
        self.engine.load().await?;
        Ok(true)
    }

    /// Run one invocation and collect its classified output
    ///
    /// `args` are forwarded verbatim and in order. Engine failures are
    /// returned unchanged.
    pub async fn invoke<I, S>(&self, args: I, options: RunOptions) -> Result<RunResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let _exclusive = self.gate.lock().await;

        let on_progress = options.on_progress.unwrap_or_else(|| Box::new(|_| {}));
        let classifier = Arc::new(Mutex::new(LogClassifier::new(on_progress)));

        let tap = self.tap.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let sink_classifier = classifier.clone();
        let sink: LogSink = Arc::new(move |record| {
            if let Some(tap) = &tap {
                tap(&record);
            }
            sink_classifier
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .classify(record);
        });

        let guard = SinkGuard::install(self.engine.as_ref(), sink);
        let outcome = self.engine.run(&args).await;
        drop(guard);
        outcome?;

        let result = classifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .result();
        debug!(
            "Invocation '{}' finished: {} out, {} err lines",
            args.join(" "),
            result.out_lines.len(),
            result.err_lines.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scripted::{Outcome, Script, ScriptedEngine};
    use crate::error::{EngineError, ShowcaseError};
    use std::time::Duration;

    fn help_script() -> Script {
        Script::matching("--help")
            .log(LogRecord::err("Splitting the commandline."))
            .log(LogRecord::err("Applying option help (show help)"))
            .log(LogRecord::out("usage: ffmpeg [options]"))
            .log(LogRecord::err("deprecated option"))
            .log(LogRecord::out("Getting help:"))
    }

    #[tokio::test]
    async fn test_invoke_collects_classified_lines() {
        let engine = Arc::new(ScriptedEngine::new().loaded().script(help_script()));
        let invoker = RunInvoker::new(engine.clone());

        let result = invoker.invoke(["--help", "long"], RunOptions::default()).await.unwrap();

        assert_eq!(result.out_lines, vec!["usage: ffmpeg [options]", "Getting help:"]);
        assert_eq!(result.err_lines, vec!["deprecated option"]);
        assert_eq!(engine.events(), vec!["run --help long", "done --help long"]);
    }

    #[tokio::test]
    async fn test_progress_fires_before_resolution() {
        let engine = Arc::new(ScriptedEngine::new().loaded().script(help_script()));
        let invoker = RunInvoker::new(engine);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let progress = seen.clone();
        let options = RunOptions::default()
            .on_progress(move |record| progress.lock().unwrap().push(record.message.clone()));

        invoker.invoke(["--help"], options).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["usage: ffmpeg [options]", "deprecated option", "Getting help:"]
        );
    }

    #[tokio::test]
    async fn test_sink_restored_after_success() {
        let engine = Arc::new(ScriptedEngine::new().loaded().script(help_script()));
        let invoker = RunInvoker::new(engine.clone());

        let seen = Arc::new(Mutex::new(0usize));
        let progress = seen.clone();
        let options = RunOptions::default().on_progress(move |_| *progress.lock().unwrap() += 1);
        invoker.invoke(["--help"], options).await.unwrap();
        let count = *seen.lock().unwrap();

        // Records logged after the call must not reach the finished classifier
        engine.emit(LogRecord::out("late record"));
        assert_eq!(*seen.lock().unwrap(), count);
    }

    #[tokio::test]
    async fn test_failure_propagates_and_restores_sink() {
        let engine = Arc::new(
            ScriptedEngine::new()
                .loaded()
                .script(Script::matching("bad.mp4").log(LogRecord::err("bad.mp4: Invalid data")).outcome(Outcome::Fail(1))),
        );
        let invoker = RunInvoker::new(engine.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let progress = seen.clone();
        let options = RunOptions::default()
            .on_progress(move |record| progress.lock().unwrap().push(record.message.clone()));

        let err = invoker.invoke(["-i", "bad.mp4", "out.mp3"], options).await.unwrap_err();
        assert!(matches!(
            err,
            ShowcaseError::Engine(EngineError::RunFailed { code: Some(1), .. })
        ));

        engine.emit(LogRecord::err("late record"));
        assert_eq!(*seen.lock().unwrap(), vec!["bad.mp4: Invalid data"]);
    }

    #[tokio::test]
    async fn test_dropped_invocation_restores_sink() {
        let engine = Arc::new(
            ScriptedEngine::new()
                .loaded()
                .script(Script::matching("out.mp4").log(LogRecord::out("frame=1")).outcome(Outcome::Hang)),
        );
        let invoker = RunInvoker::new(engine.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let progress = seen.clone();
        let options = RunOptions::default()
            .on_progress(move |record| progress.lock().unwrap().push(record.message.clone()));

        let stalled = invoker.invoke(["out.mp4"], options);
        let timed_out = tokio::time::timeout(Duration::from_millis(50), stalled).await;
        assert!(timed_out.is_err());

        engine.emit(LogRecord::out("late record"));
        assert_eq!(*seen.lock().unwrap(), vec!["frame=1"]);
    }

    #[tokio::test]
    async fn test_invocations_never_overlap() {
        let engine = Arc::new(
            ScriptedEngine::new()
                .loaded()
                .script(Script::matching("-version").log(LogRecord::out("ffmpeg version")).log(LogRecord::out("built with")))
                .script(Script::matching("-L").log(LogRecord::out("license")).log(LogRecord::out("GPL"))),
        );
        let invoker = RunInvoker::new(engine.clone());

        let (version, license) = tokio::join!(
            invoker.invoke(["-version"], RunOptions::default()),
            invoker.invoke(["-L"], RunOptions::default())
        );

        assert_eq!(version.unwrap().out_lines, vec!["ffmpeg version", "built with"]);
        assert_eq!(license.unwrap().out_lines, vec!["license", "GPL"]);
        assert_eq!(engine.events(), vec!["run -version", "done -version", "run -L", "done -L"]);
    }

    #[tokio::test]
    async fn test_tap_sees_suppressed_records() {
        let engine = Arc::new(ScriptedEngine::new().loaded().script(help_script()));
        let invoker = RunInvoker::new(engine);

        let tapped = Arc::new(Mutex::new(Vec::new()));
        let sink = tapped.clone();
        invoker.set_tap(Arc::new(move |record: &LogRecord| sink.lock().unwrap().push(record.message.clone())));

        let result = invoker.invoke(["--help"], RunOptions::default()).await.unwrap();

        let tapped = tapped.lock().unwrap();
        assert_eq!(tapped.first().map(String::as_str), Some("Splitting the commandline."));
        assert_eq!(tapped.last().map(String::as_str), Some("FFMPEG_END"));
        assert_eq!(result.out_lines, vec!["usage: ffmpeg [options]", "Getting help:"]);
    }

    #[tokio::test]
    async fn test_ensure_loaded_loads_once() {
        let engine = Arc::new(ScriptedEngine::new());
        let invoker = RunInvoker::new(engine.clone());

        assert!(invoker.ensure_loaded().await.unwrap());
        assert!(!invoker.ensure_loaded().await.unwrap());
        assert_eq!(engine.events(), vec!["load"]);
    }
}
