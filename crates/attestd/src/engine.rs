//! Camera engine — owns the blocking V4L2 device on a dedicated OS
//! thread and exposes it to the session as an async [`FrameSource`].

use async_trait::async_trait;
use attest_core::{CaptureError, FramePayload, FrameSource};
use attest_hw::{Camera, CameraError};
use tokio::sync::{mpsc, oneshot};

enum EngineRequest {
    Capture {
        reply: oneshot::Sender<Result<attest_hw::Frame, CameraError>>,
    },
}

/// Clone-safe handle to the camera engine thread.
#[derive(Clone)]
pub struct CameraEngine {
    tx: mpsc::Sender<EngineRequest>,
}

/// Spawn the camera engine on a dedicated OS thread.
///
/// Opens the device and discards warmup frames synchronously, failing
/// fast if the camera is unavailable, then enters a request loop.
pub fn spawn_engine(device_path: &str, warmup_frames: usize) -> Result<CameraEngine, CameraError> {
    let camera = Camera::open(device_path)?;
    camera.warmup(warmup_frames);

    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);

    std::thread::Builder::new()
        .name("attest-camera".into())
        .spawn(move || {
            tracing::info!("camera engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Capture { reply } => {
                        let _ = reply.send(camera.capture_frame());
                    }
                }
            }
            tracing::info!("camera engine thread exiting");
        })
        .expect("failed to spawn camera engine thread");

    Ok(CameraEngine { tx })
}

#[async_trait]
impl FrameSource for CameraEngine {
    async fn request_permission(&self) -> bool {
        // The daemon's device access was granted when the engine
        // opened the camera at startup; permission holds while the
        // engine thread is alive.
        !self.tx.is_closed()
    }

    fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }

    async fn capture_frame(&self) -> Result<FramePayload, CaptureError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Capture { reply: reply_tx })
            .await
            .map_err(|_| CaptureError::NotReady)?;
        let frame = reply_rx
            .await
            .map_err(|_| CaptureError::NotReady)?
            .map_err(|e| CaptureError::Failed(e.to_string()))?;

        let data = frame
            .to_jpeg()
            .map_err(|e| CaptureError::Failed(e.to_string()))?;
        Ok(FramePayload {
            data,
            sequence: frame.sequence,
            captured_at: frame.captured_at,
        })
    }
}
