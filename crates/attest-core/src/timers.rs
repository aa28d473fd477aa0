//! The session's three periodic schedules as abortable tick tasks.

use crate::config::SessionConfig;
use crate::session::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Which periodic schedule a tick came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    Capture,
    Verify,
    Countdown,
}

/// One periodic schedule: a detached task that sends a tick event every
/// `period`, starting one period from now. Aborted on drop so a stopped
/// schedule can never fire again (ticks already queued in the event
/// channel are discarded by the epoch guard).
struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    fn spawn(
        kind: TimerKind,
        period: Duration,
        epoch: u64,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if events
                    .send(SessionEvent::Tick { kind, epoch })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The capture, verify-trigger and countdown schedules, started and
/// stopped as one unit for background/foreground transitions.
pub(crate) struct TimerSet {
    _capture: PeriodicTask,
    _verify: PeriodicTask,
    _countdown: PeriodicTask,
}

impl TimerSet {
    pub(crate) fn start(
        config: &SessionConfig,
        epoch: u64,
        events: &mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            _capture: PeriodicTask::spawn(
                TimerKind::Capture,
                config.capture_interval,
                epoch,
                events.clone(),
            ),
            _verify: PeriodicTask::spawn(
                TimerKind::Verify,
                config.verify_interval,
                epoch,
                events.clone(),
            ),
            _countdown: PeriodicTask::spawn(
                TimerKind::Countdown,
                config.countdown_interval,
                epoch,
                events.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_carry_kind_and_epoch() {
        let (tx, mut rx) = mpsc::channel(16);
        let _task = PeriodicTask::spawn(TimerKind::Countdown, Duration::from_secs(1), 3, tx);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        match rx.recv().await.unwrap() {
            SessionEvent::Tick { kind, epoch } => {
                assert_eq!(kind, TimerKind::Countdown);
                assert_eq!(epoch, 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_task_stops_ticking() {
        let (tx, mut rx) = mpsc::channel(16);
        let task = PeriodicTask::spawn(TimerKind::Capture, Duration::from_millis(100), 0, tx);

        tokio::time::sleep(Duration::from_millis(350)).await;
        drop(task);
        // Drain whatever was queued before the abort.
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err(), "aborted schedule fired again");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_set_runs_all_three_schedules() {
        let (tx, mut rx) = mpsc::channel(64);
        let config = SessionConfig::default();
        let _set = TimerSet::start(&config, 1, &tx);

        tokio::time::sleep(Duration::from_millis(4100)).await;

        let mut kinds = Vec::new();
        while let Ok(SessionEvent::Tick { kind, .. }) = rx.try_recv() {
            kinds.push(kind);
        }
        assert!(kinds.contains(&TimerKind::Capture));
        assert!(kinds.contains(&TimerKind::Verify));
        assert!(kinds.contains(&TimerKind::Countdown));
    }
}
