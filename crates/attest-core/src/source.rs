use crate::types::FramePayload;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera not ready")]
    NotReady,
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Boundary to the camera: produces one encoded frame per request.
///
/// The session controller drives capture at a fixed cadence; a source
/// never self-schedules. Capture failures are non-fatal — the frame is
/// dropped and the next tick tries again.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Ask the platform for camera permission. A denial is fatal to
    /// session start and is surfaced exactly once.
    async fn request_permission(&self) -> bool;

    /// Whether the camera is mounted and able to capture right now.
    fn is_ready(&self) -> bool;

    async fn capture_frame(&self) -> Result<FramePayload, CaptureError>;
}
