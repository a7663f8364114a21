//! Persona agent
//!
//! Turns one visitor message into a stream of answer chunks:
//!
//! ```text
//! ┌─────────┐  history + message  ┌──────────────┐  persona + tools  ┌──────────┐
//! │ Session │ ──────────────────▶ │ Orchestrator │ ────────────────▶ │ Provider │
//! └─────────┘                     └──────────────┘ ◀──────────────── └──────────┘
//!      ▲                            │         │      text | tool call
//!      │ completed turn             │         ▼
//!      │                            │   ┌──────────────┐
//!      │                            │   │ ToolRegistry │ validate + execute
//!      │                            │   └──────────────┘
//!      │                            ▼
//!      └──────────────────────── TurnStream (text* | toolResult | error)
//! ```
//!
//! ```rust,ignore
//! let agent = Agent::builder(registry, persona_prompt(&profile), provider).build();
//! let mut session = Session::new();
//! let chunks = session.send(&agent, "What are your skills?").await;
//! ```

mod error;
mod orchestrator;
mod session;
mod stream;

pub use error::{ErrorKind, HistoryError, TurnError};
pub use orchestrator::{Agent, AgentBuilder};
pub use session::{validate_history, Session, TurnRecorder};
pub use stream::{CancelHandle, TurnChunk, TurnStream};
