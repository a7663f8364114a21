//! Logging abstractions for runtime-agnostic logging
//!
//! Components take an `Arc<dyn Logger>` so hosts decide where output goes:
//! tests use `NoOpLogger`, the CLI routes through `TracingLogger`.

mod traits;
mod noop;
mod tracing_logger;
mod capture;

pub use traits::Logger;
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;
pub use capture::CaptureLogger;
