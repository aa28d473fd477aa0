use attest_core::SessionHandle;
use zbus::interface;

/// D-Bus control surface for the Attest liveness daemon.
///
/// Bus name: org.attest.Attest1
/// Object path: /org/attest/Attest1
pub struct AttestService {
    handle: SessionHandle,
}

impl AttestService {
    pub fn new(handle: SessionHandle) -> Self {
        Self { handle }
    }
}

#[interface(name = "org.attest.Attest1")]
impl AttestService {
    /// Start a liveness check-in session (the capture UI became
    /// visible). A no-op if a session is already running.
    async fn start_session(&self) -> zbus::fdo::Result<()> {
        tracing::info!("start_session requested");
        self.handle
            .set_visible(true)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Cancel the running session silently (the capture UI went away).
    async fn cancel_session(&self) -> zbus::fdo::Result<()> {
        tracing::info!("cancel_session requested");
        self.handle
            .set_visible(false)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Report an app foreground/background transition so session
    /// timers can suspend and resume.
    async fn set_foreground(&self, foreground: bool) -> zbus::fdo::Result<()> {
        tracing::info!(foreground, "set_foreground requested");
        self.handle
            .set_foreground(foreground)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Current session snapshot as JSON.
    async fn status(&self) -> zbus::fdo::Result<String> {
        let view = serde_json::to_value(self.handle.view())
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "session": view,
        })
        .to_string())
    }
}
