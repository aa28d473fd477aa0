use serde::Serialize;

/// An encoded camera frame awaiting verification.
///
/// The pixel data is opaque to the session engine — whatever the frame
/// source encodes (JPEG in the shipped adapter) is what the verification
/// backend receives.
#[derive(Clone)]
pub struct FramePayload {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// Capture sequence number from the source.
    pub sequence: u32,
    pub captured_at: std::time::Instant,
}

impl std::fmt::Debug for FramePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Pixel data elided; a frame can be tens of kilobytes.
        f.debug_struct("FramePayload")
            .field("bytes", &self.data.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Lifecycle state of a liveness session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Processing,
    Success,
    Timeout,
    /// Reserved for hard failures that are neither timeout nor cancellation.
    Failed,
}

/// One-shot alert surfaced when a session cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    PermissionDenied,
    CameraUnavailable,
}

/// UI-facing snapshot of the live session, published on every change.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub status: SessionStatus,
    /// Current human-readable instruction text.
    pub guidance: String,
    /// Whole seconds left in the session budget.
    pub remaining_secs: u64,
    /// Verification dispatches sent so far (diagnostic).
    pub attempt_count: u32,
    pub alert: Option<Alert>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            guidance: String::new(),
            remaining_secs: 0,
            attempt_count: 0,
            alert: None,
        }
    }
}

/// Terminal result of a session, delivered once per session unless the
/// session was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub success: bool,
    /// Verification dispatches the session sent before resolving.
    pub attempts: u32,
}
