//! Logger that keeps messages in memory

use std::sync::Mutex;

use super::traits::Logger;

/// Records every message with its level, for assertions in tests and for
/// hosts that render a log pane.
#[derive(Debug, Default)]
pub struct CaptureLogger {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl CaptureLogger {
    /// Create an empty capture logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of captured `(level, message)` pairs
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        self.lines
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    /// Whether any message at `level` contains `needle`
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    fn push(&self, level: &'static str, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

impl Logger for CaptureLogger {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_capture_logger_records_levels() {
        let logger = CaptureLogger::new();
        logger.info("[Agent] turn started");
        logger.warn("[Agent] discarded 1 tool call");

        assert_eq!(logger.lines().len(), 2);
        assert!(logger.contains("warn", "discarded"));
        assert!(!logger.contains("error", "discarded"));
    }

    #[test]
    fn test_noop_logger() {
        let logger = NoOpLogger::new();
        logger.debug("debug message");
        logger.error("error message");
    }
}
