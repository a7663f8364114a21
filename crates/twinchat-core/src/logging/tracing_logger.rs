//! Logger that forwards to the `tracing` crate

use super::traits::Logger;

/// Routes `Logger` calls into `tracing` events under the `twinchat` target.
///
/// The host installs the subscriber; without one, events are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a new tracing logger
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "twinchat", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "twinchat", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "twinchat", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "twinchat", "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tracing_logger_without_subscriber() {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
