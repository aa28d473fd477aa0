use attest_core::SessionConfig;
use std::time::Duration;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Verification backend endpoint receiving frame batches.
    pub verify_endpoint: String,
    /// Per-request timeout for a verification dispatch, in seconds.
    pub verify_request_timeout_secs: u64,
    /// Warmup frames discarded at startup (camera AGC/AE stabilization).
    pub warmup_frames: usize,
    /// Frame capture cadence in milliseconds.
    pub capture_interval_ms: u64,
    /// Batch dispatch cadence in milliseconds.
    pub verify_interval_ms: u64,
    /// Overall session budget in milliseconds.
    pub session_timeout_ms: u64,
    /// Frames per verification batch.
    pub batch_size: usize,
}

impl Config {
    /// Load configuration from `ATTEST_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            camera_device: std::env::var("ATTEST_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            verify_endpoint: std::env::var("ATTEST_VERIFY_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:8080/api/face/verify".to_string()),
            verify_request_timeout_secs: env_u64("ATTEST_VERIFY_REQUEST_TIMEOUT_SECS", 10),
            warmup_frames: env_usize("ATTEST_WARMUP_FRAMES", 4),
            capture_interval_ms: env_u64("ATTEST_CAPTURE_INTERVAL_MS", 800),
            verify_interval_ms: env_u64("ATTEST_VERIFY_INTERVAL_MS", 4000),
            session_timeout_ms: env_u64("ATTEST_SESSION_TIMEOUT_MS", 60_000),
            batch_size: env_usize("ATTEST_BATCH_SIZE", 5),
        }
    }

    /// Session pacing derived from the daemon configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            capture_interval: Duration::from_millis(self.capture_interval_ms),
            verify_interval: Duration::from_millis(self.verify_interval_ms),
            session_timeout: Duration::from_millis(self.session_timeout_ms),
            batch_size: self.batch_size,
            ..SessionConfig::default()
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
