//! Verification dispatch — submits frame batches to the face-match
//! backend and reports the classified outcome back to the session.

use crate::session::SessionEvent;
use crate::types::FramePayload;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("backend request failed: {0}")]
    Request(String),
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Decision returned by the verification backend for one batch.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyDecision {
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Boundary to the face-match backend.
///
/// Must tolerate concurrent calls for the same logical session — the
/// dispatcher launches batches fire-and-forget and never serializes
/// them.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify_batch(&self, frames: Vec<FramePayload>) -> Result<VerifyDecision, VerifyError>;
}

/// Launch one verification attempt as a detached task.
///
/// The batch must hold exactly `batch_size` frames; the buffer drain
/// guarantees this, so anything else is a caller bug and the call is
/// ignored rather than sent to the backend.
pub(crate) fn dispatch_batch(
    verifier: Arc<dyn Verifier>,
    frames: Vec<FramePayload>,
    batch_size: usize,
    generation: u64,
    attempt: u32,
    events: mpsc::Sender<SessionEvent>,
) {
    if frames.len() != batch_size {
        tracing::error!(
            got = frames.len(),
            expected = batch_size,
            "refusing to dispatch malformed batch"
        );
        return;
    }

    tokio::spawn(async move {
        tracing::debug!(attempt, frames = frames.len(), "dispatching batch");
        let outcome = verifier.verify_batch(frames).await;
        // The session may have moved on; it decides based on generation.
        let _ = events
            .send(SessionEvent::VerifyOutcome {
                generation,
                outcome,
            })
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingVerifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Verifier for CountingVerifier {
        async fn verify_batch(
            &self,
            _frames: Vec<FramePayload>,
        ) -> Result<VerifyDecision, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(VerifyDecision {
                is_match: false,
                message: None,
            })
        }
    }

    fn frames(n: usize) -> Vec<FramePayload> {
        (0..n)
            .map(|i| FramePayload {
                data: vec![0u8; 4],
                sequence: i as u32,
                captured_at: std::time::Instant::now(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_wrong_batch_size_never_reaches_backend() {
        let verifier = Arc::new(CountingVerifier {
            calls: AtomicUsize::new(0),
        });
        let (tx, mut rx) = mpsc::channel(4);

        dispatch_batch(verifier.clone(), frames(3), 5, 1, 1, tx);
        tokio::task::yield_now().await;

        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_exact_batch_dispatches_and_reports() {
        let verifier = Arc::new(CountingVerifier {
            calls: AtomicUsize::new(0),
        });
        let (tx, mut rx) = mpsc::channel(4);

        dispatch_batch(verifier.clone(), frames(5), 5, 7, 1, tx);

        let event = rx.recv().await.unwrap();
        match event {
            SessionEvent::VerifyOutcome {
                generation,
                outcome,
            } => {
                assert_eq!(generation, 7);
                assert!(!outcome.unwrap().is_match);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_decision_wire_format() {
        let decision: VerifyDecision =
            serde_json::from_str(r#"{"isMatch": true, "message": "ok"}"#).unwrap();
        assert!(decision.is_match);
        assert_eq!(decision.message.as_deref(), Some("ok"));

        let bare: VerifyDecision = serde_json::from_str(r#"{"isMatch": false}"#).unwrap();
        assert!(!bare.is_match);
        assert!(bare.message.is_none());
    }
}
