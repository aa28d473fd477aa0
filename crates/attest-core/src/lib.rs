//! attest-core — Liveness capture-and-verify session engine.
//!
//! Drives a camera frame source at a fixed cadence, accumulates frames
//! into fixed-size batches, submits batches to a verification backend,
//! and runs the session countdown — all as one event-driven state
//! machine that survives app background/foreground transitions.

pub mod buffer;
pub mod config;
pub mod guidance;
pub mod session;
pub mod source;
mod timers;
pub mod types;
pub mod verify;

pub use config::SessionConfig;
pub use session::{spawn_session, SessionCommand, SessionError, SessionHandle};
pub use source::{CaptureError, FrameSource};
pub use types::{Alert, FramePayload, SessionOutcome, SessionStatus, SessionView};
pub use verify::{Verifier, VerifyDecision, VerifyError};
