use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("verify interval ({verify:?}) must exceed capture interval ({capture:?})")]
    VerifySlowerThanCapture { verify: Duration, capture: Duration },
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("session timeout must be non-zero")]
    ZeroTimeout,
}

/// Pacing constants for a liveness session.
///
/// Changing these alters only the cadence of the state machine, never
/// its structure.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often a frame is requested from the source.
    pub capture_interval: Duration,
    /// How often the buffer is checked for a full batch to dispatch.
    /// Must exceed `capture_interval` so batches can fill.
    pub verify_interval: Duration,
    /// Countdown recomputation cadence.
    pub countdown_interval: Duration,
    /// Overall session budget; reaching it ends the session as a timeout.
    pub session_timeout: Duration,
    /// Frames per verification batch.
    pub batch_size: usize,
    /// Delay between reaching a terminal state and delivering the
    /// outcome, so callers can show a success/timeout indicator first.
    pub completion_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture_interval: Duration::from_millis(800),
            verify_interval: Duration::from_millis(4000),
            countdown_interval: Duration::from_millis(1000),
            session_timeout: Duration::from_millis(60_000),
            batch_size: 5,
            completion_grace: Duration::from_millis(1000),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.session_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.verify_interval <= self.capture_interval {
            return Err(ConfigError::VerifySlowerThanCapture {
                verify: self.verify_interval,
                capture: self.capture_interval,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_verify_must_exceed_capture() {
        let cfg = SessionConfig {
            capture_interval: Duration::from_millis(800),
            verify_interval: Duration::from_millis(800),
            ..SessionConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::VerifySlowerThanCapture { .. })
        ));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let cfg = SessionConfig {
            batch_size: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroBatchSize)));
    }
}
