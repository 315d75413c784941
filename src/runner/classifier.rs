use crate::engine::{Channel, LogRecord, END_SENTINEL};
use crate::runner::RunResult;

/// Record the engine logs before echoing how it parsed its arguments
pub const PARSE_START_SENTINEL: &str = "Splitting the commandline.";

/// Prefix of the per-argument echo lines that follow [`PARSE_START_SENTINEL`]
pub const OPTION_ECHO_PREFIX: &str = "Applying option ";

/// Callback receiving every signal record as it is classified
pub type ProgressFn = Box<dyn FnMut(&LogRecord) + Send>;

/// Where a classified record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Signal,
    Suppressed,
}

/// Splits the log stream of one invocation into signal and noise
///
/// The engine echoes its own argument parsing as a block of diagnostic lines
/// opened by [`PARSE_START_SENTINEL`]. Everything from that sentinel up to
/// the first record after a run of [`OPTION_ECHO_PREFIX`] lines is noise.
/// The [`END_SENTINEL`] record is always noise. Every other record is signal:
/// it is kept in order and handed to the progress callback.
pub struct LogClassifier {
    on_progress: ProgressFn,
    signal: Vec<LogRecord>,
    suppressed: Vec<LogRecord>,
    suppressing: bool,
}

impl LogClassifier {
    pub fn new(on_progress: ProgressFn) -> Self {
        Self {
            on_progress,
            signal: Vec::new(),
            suppressed: Vec::new(),
            suppressing: false,
        }
    }

    /// Classifier without a progress callback
    pub fn silent() -> Self {
        Self::new(Box::new(|_| {}))
    }

    pub fn classify(&mut self, record: LogRecord) -> Verdict {
        let echo_finished = self
            .suppressed
            .last()
            .is_some_and(|last| last.message.starts_with(OPTION_ECHO_PREFIX))
            && !record.message.starts_with(OPTION_ECHO_PREFIX);
        if echo_finished {
            self.suppressing = false;
        }

        // A new parse block always wins over the end of the previous echo
        if record.message == PARSE_START_SENTINEL {
            self.suppressing = true;
        }

        if self.suppressing || record.message == END_SENTINEL {
            self.suppressed.push(record);
            return Verdict::Suppressed;
        }

        (self.on_progress)(&record);
        self.signal.push(record);
        Verdict::Signal
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppressing
    }

    /// Signal records on the standard output channel, in arrival order
    pub fn out(&self) -> Vec<String> {
        self.messages(Channel::Out)
    }

    /// Signal records on the standard error channel, in arrival order
    pub fn err(&self) -> Vec<String> {
        self.messages(Channel::Err)
    }

    pub fn signal(&self) -> &[LogRecord] {
        &self.signal
    }

    pub fn suppressed(&self) -> &[LogRecord] {
        &self.suppressed
    }

    pub fn result(&self) -> RunResult {
        RunResult {
            out_lines: self.out(),
            err_lines: self.err(),
        }
    }

    fn messages(&self, channel: Channel) -> Vec<String> {
        self.signal
            .iter()
            .filter(|record| record.channel == channel)
            .map(|record| record.message.clone())
            .collect()
    }
}

impl std::fmt::Debug for LogClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogClassifier")
            .field("signal", &self.signal.len())
            .field("suppressed", &self.suppressed.len())
            .field("suppressing", &self.suppressing)
            .finish()
    }
}
