//! Liveness session controller.
//!
//! One spawned task owns all session state and consumes a single event
//! channel fed by the periodic schedules, detached capture tasks, and
//! detached verification dispatches. All mutation is sequential inside
//! this task; the remaining hazard — an async result arriving after the
//! session moved on — is handled by generation guards on every event.
//!
//! State machine: `Idle → Processing → {Success, Timeout}`, with a
//! silent `Processing → Idle` cancellation when the capture UI goes
//! away. The countdown is recomputed from wall-clock elapsed time, not
//! from tick counting, so it self-corrects across app suspension.

use crate::buffer::FrameBuffer;
use crate::config::SessionConfig;
use crate::guidance;
use crate::source::FrameSource;
use crate::timers::{TimerKind, TimerSet};
use crate::types::{Alert, FramePayload, SessionOutcome, SessionStatus, SessionView};
use crate::verify::{self, Verifier, VerifyDecision, VerifyError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session controller has shut down")]
    Closed,
}

/// Externally-driven signals into the controller.
#[derive(Debug, Clone, Copy)]
pub enum SessionCommand {
    /// The capture UI became visible (true) or was dismissed (false).
    /// Visibility-false cancels a running session silently.
    SetVisible(bool),
    /// The application moved to foreground (true) or background (false).
    SetForeground(bool),
}

/// Internal events feeding the controller task.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Tick {
        kind: TimerKind,
        epoch: u64,
    },
    /// A capture attempt resolved. `None` means the frame was dropped.
    FrameCaptured {
        generation: u64,
        frame: Option<FramePayload>,
    },
    /// A verification dispatch resolved.
    VerifyOutcome {
        generation: u64,
        outcome: Result<VerifyDecision, VerifyError>,
    },
    /// The completion grace delay elapsed.
    CompletionDue {
        generation: u64,
    },
}

/// Clone-safe handle to a session controller task.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
    view_rx: watch::Receiver<SessionView>,
}

impl SessionHandle {
    /// Signal that the capture UI became visible or was dismissed.
    pub async fn set_visible(&self, visible: bool) -> Result<(), SessionError> {
        self.cmd_tx
            .send(SessionCommand::SetVisible(visible))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Signal an application foreground/background transition.
    pub async fn set_foreground(&self, foreground: bool) -> Result<(), SessionError> {
        self.cmd_tx
            .send(SessionCommand::SetForeground(foreground))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Current UI-facing snapshot.
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }
}

/// Spawn a session controller.
///
/// `outcome_tx` is the completion callback: exactly one message is sent
/// per session that reaches `Success` or `Timeout`; a cancelled session
/// sends nothing. The controller task exits when every handle is
/// dropped.
pub fn spawn_session(
    source: Arc<dyn FrameSource>,
    verifier: Arc<dyn Verifier>,
    config: SessionConfig,
    outcome_tx: mpsc::Sender<SessionOutcome>,
) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::channel(64);
    let (view_tx, view_rx) = watch::channel(SessionView::default());

    let controller = Controller {
        source,
        verifier,
        config,
        outcome_tx,
        view_tx,
        event_tx,
        status: SessionStatus::Idle,
        started_at: None,
        buffer: FrameBuffer::new(),
        attempt_count: 0,
        generation: 0,
        timer_epoch: 0,
        timers: None,
        foreground: true,
        guidance: String::new(),
        alert: None,
        pending_outcome: None,
    };
    tokio::spawn(controller.run(cmd_rx, event_rx));

    SessionHandle { cmd_tx, view_rx }
}

struct Controller {
    source: Arc<dyn FrameSource>,
    verifier: Arc<dyn Verifier>,
    config: SessionConfig,
    outcome_tx: mpsc::Sender<SessionOutcome>,
    view_tx: watch::Sender<SessionView>,
    event_tx: mpsc::Sender<SessionEvent>,

    status: SessionStatus,
    started_at: Option<Instant>,
    buffer: FrameBuffer,
    attempt_count: u32,
    /// Bumped on start and cancel; voids in-flight capture/dispatch
    /// results and pending completion delivery from an earlier session.
    generation: u64,
    /// Bumped on every timer-set start; voids ticks still queued from a
    /// stopped set.
    timer_epoch: u64,
    timers: Option<TimerSet>,
    foreground: bool,
    guidance: String,
    alert: Option<Alert>,
    /// Set by the terminal transition, consumed once by CompletionDue.
    pending_outcome: Option<bool>,
}

impl Controller {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<SessionCommand>,
        mut event_rx: mpsc::Receiver<SessionEvent>,
    ) {
        tracing::debug!("session controller started");
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    // Every handle dropped; timers abort on drop.
                    None => break,
                },
                Some(event) = event_rx.recv() => self.handle_event(event),
            }
        }
        tracing::debug!("session controller exiting");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::SetVisible(true) => {
                if self.status == SessionStatus::Idle {
                    self.start_session().await;
                }
            }
            SessionCommand::SetVisible(false) => {
                if self.status != SessionStatus::Idle {
                    self.cancel_session();
                }
            }
            SessionCommand::SetForeground(false) => {
                self.foreground = false;
                if self.status == SessionStatus::Processing && self.timers.is_some() {
                    tracing::info!("app backgrounded; suspending session timers");
                    self.timers = None;
                }
            }
            SessionCommand::SetForeground(true) => {
                self.foreground = true;
                if self.status == SessionStatus::Processing && self.timers.is_none() {
                    // Elapsed time kept accruing while suspended; the
                    // recomputation may already show the budget spent.
                    let remaining = self.remaining_secs();
                    tracing::info!(remaining_secs = remaining, "app foregrounded; resuming session");
                    self.guidance = guidance::for_remaining(remaining).to_string();
                    self.publish();
                    if remaining == 0 {
                        self.finish(false);
                    } else {
                        self.start_timers();
                    }
                }
            }
        }
    }

    /// `Idle → Processing`, gated on camera permission and readiness.
    async fn start_session(&mut self) {
        self.alert = None;
        if !self.source.request_permission().await {
            tracing::warn!("camera permission denied; session not started");
            self.alert = Some(Alert::PermissionDenied);
            self.publish();
            return;
        }
        if !self.source.is_ready() {
            tracing::warn!("camera not ready; session not started");
            self.alert = Some(Alert::CameraUnavailable);
            self.publish();
            return;
        }

        self.generation += 1;
        self.buffer.clear();
        self.attempt_count = 0;
        self.pending_outcome = None;
        self.started_at = Some(Instant::now());
        self.status = SessionStatus::Processing;
        self.guidance = guidance::PROMPT_HOLD_STEADY.to_string();
        if self.foreground {
            self.start_timers();
        }
        tracing::info!(generation = self.generation, "liveness session started");
        self.publish();
    }

    /// Silent `* → Idle`. No outcome is ever delivered for a cancelled
    /// session, including one cancelled during the completion grace
    /// window.
    fn cancel_session(&mut self) {
        self.timers = None;
        self.generation += 1;
        self.status = SessionStatus::Idle;
        self.started_at = None;
        self.buffer.clear();
        self.attempt_count = 0;
        self.pending_outcome = None;
        self.guidance.clear();
        tracing::info!("session cancelled; no outcome delivered");
        self.publish();
    }

    fn start_timers(&mut self) {
        self.timer_epoch += 1;
        self.timers = Some(TimerSet::start(&self.config, self.timer_epoch, &self.event_tx));
    }

    /// Whole seconds left, computed from wall-clock elapsed time.
    fn remaining_secs(&self) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        self.config
            .session_timeout
            .saturating_sub(started_at.elapsed())
            .as_secs()
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick { kind, epoch } => {
                // Ticks queued before a timer-set stop are void.
                if self.status != SessionStatus::Processing
                    || self.timers.is_none()
                    || epoch != self.timer_epoch
                {
                    return;
                }
                match kind {
                    TimerKind::Capture => self.on_capture_tick(),
                    TimerKind::Verify => self.on_verify_tick(),
                    TimerKind::Countdown => self.on_countdown_tick(),
                }
            }
            SessionEvent::FrameCaptured { generation, frame } => {
                if generation != self.generation || self.status != SessionStatus::Processing {
                    return;
                }
                if let Some(frame) = frame {
                    self.buffer.push(frame);
                    tracing::trace!(buffered = self.buffer.len(), "frame buffered");
                }
            }
            SessionEvent::VerifyOutcome { generation, outcome } => {
                if generation != self.generation || self.status != SessionStatus::Processing {
                    tracing::debug!("discarding verification result for finished session");
                    return;
                }
                match outcome {
                    Ok(decision) if decision.is_match => {
                        tracing::info!(attempts = self.attempt_count, "face matched");
                        self.finish(true);
                    }
                    Ok(decision) => {
                        tracing::debug!(
                            message = decision.message.as_deref().unwrap_or_default(),
                            "no match; session continues"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "verification attempt failed; session continues");
                    }
                }
            }
            SessionEvent::CompletionDue { generation } => {
                if generation != self.generation {
                    return;
                }
                if let Some(success) = self.pending_outcome.take() {
                    let outcome = SessionOutcome {
                        success,
                        attempts: self.attempt_count,
                    };
                    if self.outcome_tx.try_send(outcome).is_err() {
                        tracing::warn!("outcome receiver gone; completion dropped");
                    }
                }
            }
        }
    }

    /// Request one frame from the source without blocking the event
    /// loop. A failed capture drops the frame; the next tick retries
    /// naturally.
    fn on_capture_tick(&mut self) {
        let source = Arc::clone(&self.source);
        let events = self.event_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let frame = match source.capture_frame().await {
                Ok(frame) => Some(frame),
                Err(err) => {
                    tracing::debug!(error = %err, "frame capture failed; dropping");
                    None
                }
            };
            let _ = events
                .send(SessionEvent::FrameCaptured { generation, frame })
                .await;
        });
    }

    /// Drain a full batch if one is ready and dispatch it. Dispatches
    /// overlap freely; nothing waits on an in-flight attempt.
    fn on_verify_tick(&mut self) {
        let Some(batch) = self.buffer.try_drain_full(self.config.batch_size) else {
            tracing::trace!(buffered = self.buffer.len(), "batch not full yet");
            return;
        };
        self.attempt_count += 1;
        verify::dispatch_batch(
            Arc::clone(&self.verifier),
            batch,
            self.config.batch_size,
            self.generation,
            self.attempt_count,
            self.event_tx.clone(),
        );
        self.publish();
    }

    fn on_countdown_tick(&mut self) {
        let remaining = self.remaining_secs();
        self.guidance = guidance::for_remaining(remaining).to_string();
        self.publish();
        if remaining == 0 {
            self.finish(false);
        }
    }

    /// Terminal transition `Processing → {Success, Timeout}`.
    ///
    /// Stops the timer set before anything else so no further tick can
    /// observe the session mid-transition, then schedules the one-shot
    /// outcome delivery after the grace delay.
    fn finish(&mut self, success: bool) {
        debug_assert_eq!(self.status, SessionStatus::Processing);
        self.timers = None;
        self.status = if success {
            SessionStatus::Success
        } else {
            SessionStatus::Timeout
        };
        self.guidance = if success {
            guidance::PROMPT_MATCHED
        } else {
            guidance::PROMPT_TIMED_OUT
        }
        .to_string();
        self.pending_outcome = Some(success);
        tracing::info!(
            success,
            attempts = self.attempt_count,
            "session finished"
        );
        self.publish();

        let events = self.event_tx.clone();
        let generation = self.generation;
        let grace = self.config.completion_grace;
        tokio::spawn(async move {
            sleep(grace).await;
            let _ = events.send(SessionEvent::CompletionDue { generation }).await;
        });
    }

    fn publish(&self) {
        let _ = self.view_tx.send(SessionView {
            status: self.status,
            guidance: self.guidance.clone(),
            remaining_secs: self.remaining_secs(),
            attempt_count: self.attempt_count,
            alert: self.alert,
        });
    }
}
