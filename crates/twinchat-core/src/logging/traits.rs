//! Logger trait definition

/// Sink for component log messages
///
/// Messages are plain strings prefixed with the component, e.g.
/// `[Agent] turn 3: executing getSkills (c1)`.
///
/// Implementations:
/// - `NoOpLogger`: discards everything
/// - `CaptureLogger`: keeps messages for assertions
/// - `TracingLogger`: forwards to the `tracing` ecosystem
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);
}
