//! # Runner Module
//!
//! Turns the engine's single "run" primitive into typed per-call output.
//!
//! Every invocation gets its own [`LogClassifier`], installed as the engine's
//! log sink for exactly the duration of that call by [`RunInvoker`].

pub mod classifier;
pub mod invoker;

pub use classifier::{LogClassifier, ProgressFn, Verdict};
pub use invoker::{LogTap, RunInvoker, RunOptions};

/// Classified output of one finished invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub out_lines: Vec<String>,
    pub err_lines: Vec<String>,
}

impl RunResult {
    /// Standard output joined into one trimmed block of text
    pub fn out_text(&self) -> String {
        self.out_lines.join("\n").trim().to_string()
    }

    /// Standard error joined into one trimmed block of text
    pub fn err_text(&self) -> String {
        self.err_lines.join("\n").trim().to_string()
    }

    pub fn has_errors(&self) -> bool {
        !self.err_lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_joined_and_trimmed() {
        let result = RunResult {
            out_lines: vec!["".into(), "ffmpeg version 6.0".into(), "built with gcc  ".into()],
            err_lines: vec![],
        };

        assert_eq!(result.out_text(), "ffmpeg version 6.0\nbuilt with gcc");
        assert_eq!(result.err_text(), "");
        assert!(!result.has_errors());
    }
}
