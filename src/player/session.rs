//! Content session controller
//!
//! Owns one load attempt at a time. Every attempt gets a fresh epoch; timers
//! and surface signals carry the epoch that produced them and anything from an
//! older epoch is dropped before it reaches the reducer. All state changes go
//! through `apply`.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use super::progress::{self, TICK_FRACTION, TICK_INTERVAL};
use super::surface::{PlaybackSurface, SignalKind, SurfaceSignal};
use super::timeout::timeout_budget;
use super::timers::TimerQueue;
use crate::analytics::Analytics;
use crate::error::SessionError;
use crate::models::ContentDescriptor;

/// Grace period between the surface reporting ready and the session settling
pub const FINALIZATION_DELAY: Duration = Duration::from_millis(1500);

/// Generation number of a load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Connecting,
    FetchingResources,
    Initializing,
    Ready,
    TimedOut,
    Failed,
}

impl Stage {
    /// Stages driven by the simulated load sequence
    pub fn is_loading(self) -> bool {
        matches!(self, Stage::Connecting | Stage::FetchingResources | Stage::Initializing)
    }

    /// Stages a surface signal may still act on
    fn accepts_signal(self) -> bool {
        self.is_loading() || self == Stage::TimedOut
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    ProgressTick,
    StageAdvance,
    Timeout,
    Finalize,
}

#[derive(Debug, Clone, PartialEq)]
enum SessionEvent {
    Tick,
    StageElapsed,
    TimeoutFired,
    SurfaceReady,
    SurfaceError(String),
    FinalizeElapsed,
    ContinueAnyway,
}

impl From<TimerKind> for SessionEvent {
    fn from(kind: TimerKind) -> Self {
        match kind {
            TimerKind::ProgressTick => SessionEvent::Tick,
            TimerKind::StageAdvance => SessionEvent::StageElapsed,
            TimerKind::Timeout => SessionEvent::TimeoutFired,
            TimerKind::Finalize => SessionEvent::FinalizeElapsed,
        }
    }
}

/// Notable transitions, drained by `poll`
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    StageChanged { epoch: Epoch, stage: Stage },
    Settled { epoch: Epoch, degraded: bool },
    TimedOut { epoch: Epoch, budget: Duration },
    Failed { epoch: Epoch, error: SessionError },
}

/// Live state of one load attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub epoch: Epoch,
    pub stage: Stage,
    pub progress: f32,
    pub started_at: Instant,
    pub timeout_budget: Duration,
    /// Initializing has run its nominal duration and only a signal can move on
    pub awaiting_surface: bool,
    pub settled: bool,
    /// Accepted after a timeout without a ready signal
    pub degraded: bool,
    pub error: Option<SessionError>,
}

impl Session {
    fn new(epoch: Epoch, started_at: Instant, timeout_budget: Duration) -> Self {
        Self {
            epoch,
            stage: Stage::Connecting,
            progress: 0.0,
            started_at,
            timeout_budget,
            awaiting_surface: false,
            settled: false,
            degraded: false,
            error: None,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Failed and timed-out sessions wait for an explicit retry
    pub fn retry_offered(&self) -> bool {
        matches!(self.stage, Stage::TimedOut | Stage::Failed)
    }
}

/// Proof that a settled or ready surface exists for an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle {
    pub epoch: Epoch,
}

pub struct SessionController<S: PlaybackSurface> {
    descriptor: Option<ContentDescriptor>,
    session: Option<Session>,
    epoch: Epoch,
    timers: TimerQueue<TimerKind>,
    surface: S,
    signal_tx: Sender<SurfaceSignal>,
    signal_rx: Receiver<SurfaceSignal>,
    /// Whether surface signals for the current epoch are still wanted
    listening: bool,
    analytics: Analytics,
    finalization_delay: Duration,
    updates: Vec<SessionUpdate>,
}

impl<S: PlaybackSurface> SessionController<S> {
    pub fn new(surface: S, analytics: Analytics) -> Self {
        let (signal_tx, signal_rx) = channel();
        Self {
            descriptor: None,
            session: None,
            epoch: Epoch::default(),
            timers: TimerQueue::new(),
            surface,
            signal_tx,
            signal_rx,
            listening: false,
            analytics,
            finalization_delay: FINALIZATION_DELAY,
            updates: Vec::new(),
        }
    }

    pub fn with_finalization_delay(mut self, delay: Duration) -> Self {
        self.finalization_delay = delay;
        self
    }

    pub fn descriptor(&self) -> Option<&ContentDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.session.as_ref().map(|s| s.stage).unwrap_or(Stage::Idle)
    }

    pub fn progress(&self) -> f32 {
        self.session.as_ref().map(|s| s.progress).unwrap_or(0.0)
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// True while the current epoch still accepts ready/error signals.
    /// Settlement, failure and teardown detach the listener.
    pub fn has_listeners(&self) -> bool {
        self.listening
    }

    /// Surface instantiated and not yet unloaded; stays true while playing
    pub fn surface_attached(&self) -> bool {
        self.surface.is_loaded()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Earliest pending timer, for scheduling the next repaint
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Sender for surface signals delivered from outside the surface itself
    pub fn signal_sender(&self) -> Sender<SurfaceSignal> {
        self.signal_tx.clone()
    }

    /// Available once the session reached Ready and the surface is attached
    pub fn surface_handle(&self) -> Option<SurfaceHandle> {
        let session = self.session.as_ref()?;
        (session.stage == Stage::Ready && self.surface.is_loaded()).then_some(SurfaceHandle { epoch: session.epoch })
    }

    /// Begin loading `descriptor`. Starting the same content again restarts it
    /// under a new epoch; other content needs a fresh controller.
    pub fn start(&mut self, descriptor: ContentDescriptor, now: Instant) -> Result<Epoch, SessionError> {
        if let Some(active) = &self.descriptor {
            if active.id != descriptor.id {
                return Err(SessionError::DescriptorMismatch {
                    active: active.id.clone(),
                    requested: descriptor.id,
                });
            }
        }
        self.descriptor = Some(descriptor);
        self.begin(now)
    }

    /// Abandon the current attempt and start over from Connecting
    pub fn retry(&mut self, now: Instant) -> Result<Epoch, SessionError> {
        if self.descriptor.is_none() {
            return Err(SessionError::NotStarted);
        }
        tracing::info!("Retrying content load (previous epoch {})", self.epoch.value());
        self.begin(now)
    }

    /// Accept a timed-out session as playable. Returns false if not timed out.
    pub fn continue_anyway(&mut self, now: Instant) -> bool {
        if self.stage() != Stage::TimedOut {
            return false;
        }
        self.apply(self.epoch, SessionEvent::ContinueAnyway, now);
        true
    }

    pub fn on_surface_ready(&mut self, epoch: Epoch, now: Instant) {
        self.apply(epoch, SessionEvent::SurfaceReady, now);
    }

    pub fn on_surface_error(&mut self, epoch: Epoch, reason: &str, now: Instant) {
        self.apply(epoch, SessionEvent::SurfaceError(reason.to_string()), now);
    }

    /// Cancel every timer and listener and drop the session. Safe from any state.
    pub fn teardown(&mut self) {
        let had_state = self.session.is_some() || self.descriptor.is_some() || self.surface.is_loaded();
        self.timers.clear();
        self.surface.unload();
        self.listening = false;
        while self.signal_rx.try_recv().is_ok() {}
        self.session = None;
        self.descriptor = None;
        self.updates.clear();
        if had_state {
            // In-flight signals from the dropped attempt now miss the epoch check
            self.epoch = self.epoch.next();
            tracing::debug!("Session torn down, epoch now {}", self.epoch.value());
        }
    }

    /// Deliver queued surface signals, then every timer due by `now`
    pub fn poll(&mut self, now: Instant) -> Vec<SessionUpdate> {
        while let Ok(signal) = self.signal_rx.try_recv() {
            let event = match signal.kind {
                SignalKind::Ready => SessionEvent::SurfaceReady,
                SignalKind::Error(reason) => SessionEvent::SurfaceError(reason),
            };
            self.apply(signal.epoch, event, now);
        }

        while let Some(fired) = self.timers.pop_due(now) {
            self.apply(fired.epoch, fired.kind.into(), fired.due);
        }

        std::mem::take(&mut self.updates)
    }

    fn begin(&mut self, now: Instant) -> Result<Epoch, SessionError> {
        self.timers.clear();
        self.surface.unload();
        self.listening = false;

        let descriptor = self.descriptor.as_ref().ok_or(SessionError::NotStarted)?;
        let url = descriptor.content_url.clone();
        let budget = timeout_budget(descriptor);

        self.epoch = self.epoch.next();
        let epoch = self.epoch;
        self.session = Some(Session::new(epoch, now, budget));

        self.timers.schedule_every(epoch, TimerKind::ProgressTick, now + TICK_INTERVAL, TICK_INTERVAL);
        if let Some(duration) = progress::stage_duration(Stage::Connecting) {
            self.timers.schedule_once(epoch, TimerKind::StageAdvance, now + duration);
        }
        self.timers.schedule_once(epoch, TimerKind::Timeout, now + budget);
        self.updates.push(SessionUpdate::StageChanged { epoch, stage: Stage::Connecting });

        tracing::info!(
            "Session epoch {} loading '{}' (timeout {}s)",
            epoch.value(),
            descriptor.title,
            budget.as_secs()
        );

        self.listening = true;
        if let Err(e) = self.surface.load(&url, epoch, self.signal_tx.clone()) {
            let reason = match e {
                SessionError::Surface(reason) => reason,
                other => other.to_string(),
            };
            self.apply(epoch, SessionEvent::SurfaceError(reason), now);
        }

        Ok(epoch)
    }

    fn apply(&mut self, epoch: Epoch, event: SessionEvent, now: Instant) {
        if epoch != self.epoch {
            tracing::debug!(
                "Discarding {:?} from stale epoch {} (current {})",
                event,
                epoch.value(),
                self.epoch.value()
            );
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match event {
            SessionEvent::Tick => {
                if session.stage.is_loading() {
                    session.progress = progress::advance(session.stage, session.progress, TICK_FRACTION);
                }
            }
            SessionEvent::StageElapsed => {
                if !session.stage.is_loading() {
                    return;
                }
                match progress::next_stage(session.stage) {
                    Some(next) => {
                        session.stage = next;
                        if let Some(duration) = progress::stage_duration(next) {
                            self.timers.schedule_once(epoch, TimerKind::StageAdvance, now + duration);
                        }
                        self.updates.push(SessionUpdate::StageChanged { epoch, stage: next });
                    }
                    None => session.awaiting_surface = true,
                }
            }
            SessionEvent::TimeoutFired => {
                if !session.stage.is_loading() {
                    return;
                }
                self.timers.cancel_where(|e, kind| {
                    e == epoch && matches!(kind, TimerKind::ProgressTick | TimerKind::StageAdvance)
                });
                session.stage = Stage::TimedOut;
                session.progress = 100.0;
                session.error = Some(SessionError::TimeoutExceeded { budget: session.timeout_budget });
                tracing::warn!(
                    "Session epoch {} timed out after {}s",
                    epoch.value(),
                    session.timeout_budget.as_secs()
                );
                self.updates.push(SessionUpdate::StageChanged { epoch, stage: Stage::TimedOut });
                self.updates.push(SessionUpdate::TimedOut { epoch, budget: session.timeout_budget });
            }
            SessionEvent::SurfaceReady => {
                if !session.stage.accepts_signal() {
                    tracing::debug!("Ignoring ready signal in {:?}", session.stage);
                    return;
                }
                self.timers.cancel_epoch(epoch);
                session.stage = Stage::Ready;
                session.progress = 100.0;
                session.error = None;
                self.timers.schedule_once(epoch, TimerKind::Finalize, now + self.finalization_delay);
                self.updates.push(SessionUpdate::StageChanged { epoch, stage: Stage::Ready });
            }
            SessionEvent::SurfaceError(reason) => {
                if !session.stage.accepts_signal() {
                    tracing::debug!("Ignoring error signal in {:?}: {}", session.stage, reason);
                    return;
                }
                self.timers.cancel_epoch(epoch);
                self.listening = false;
                let error = SessionError::Surface(reason);
                tracing::error!("Session epoch {} failed: {}", epoch.value(), error);
                session.stage = Stage::Failed;
                session.error = Some(error.clone());
                self.updates.push(SessionUpdate::StageChanged { epoch, stage: Stage::Failed });
                self.updates.push(SessionUpdate::Failed { epoch, error });
            }
            SessionEvent::FinalizeElapsed => {
                if session.stage != Stage::Ready || session.settled {
                    return;
                }
                self.timers.cancel_epoch(epoch);
                self.listening = false;
                session.settled = true;
                let title = self.descriptor.as_ref().map(|d| d.title.as_str()).unwrap_or_default();
                tracing::info!("Session epoch {} settled, starting '{}'", epoch.value(), title);
                self.analytics.notify_start(title);
                self.updates.push(SessionUpdate::Settled { epoch, degraded: false });
            }
            SessionEvent::ContinueAnyway => {
                if session.stage != Stage::TimedOut {
                    return;
                }
                self.timers.cancel_epoch(epoch);
                self.listening = false;
                session.stage = Stage::Ready;
                session.settled = true;
                session.degraded = true;
                session.error = None;
                tracing::info!("Session epoch {} continuing without ready signal", epoch.value());
                self.updates.push(SessionUpdate::StageChanged { epoch, stage: Stage::Ready });
                self.updates.push(SessionUpdate::Settled { epoch, degraded: true });
            }
        }
    }
}

impl<S: PlaybackSurface> Drop for SessionController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
