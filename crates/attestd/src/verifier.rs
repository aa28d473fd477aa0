//! HTTP verification backend client.

use async_trait::async_trait;
use attest_core::{FramePayload, Verifier, VerifyDecision, VerifyError};
use std::time::Duration;

/// Posts frame batches as multipart JPEG parts and expects a JSON
/// `{"isMatch": bool, "message": ...}` decision. The backend accepts
/// concurrent requests for the same session.
pub struct HttpVerifier {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
}

impl HttpVerifier {
    pub fn new(endpoint: String, request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            request_timeout,
        }
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify_batch(&self, frames: Vec<FramePayload>) -> Result<VerifyDecision, VerifyError> {
        let mut form = reqwest::multipart::Form::new();
        for frame in frames {
            let part = reqwest::multipart::Part::bytes(frame.data)
                .file_name(format!("frame-{}.jpg", frame.sequence))
                .mime_str("image/jpeg")
                .map_err(|e| VerifyError::Request(e.to_string()))?;
            form = form.part("frames", part);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VerifyError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| VerifyError::Request(e.to_string()))?;

        response
            .json::<VerifyDecision>()
            .await
            .map_err(|e| VerifyError::Malformed(e.to_string()))
    }
}
