//! Fullscreen presentation with focus handoff back to the playback surface
//!
//! The platform can leave fullscreen on its own (window manager shortcut,
//! host-level escape). Those changes arrive through `on_platform_change` and are
//! reconciled into `active`; the coordinator's own calls never assume the
//! platform agrees until it says so.

use std::time::{Duration, Instant};

use super::session::{SessionController, SurfaceHandle};
use super::surface::PlaybackSurface;
use crate::error::{FullscreenError, SessionError};

/// Delay before focus is handed back after a transition
pub const FOCUS_RESTORE_DELAY: Duration = Duration::from_millis(100);

/// How long the platform may keep reporting the old state after our own request
pub const PLATFORM_SETTLE_TIMEOUT: Duration = Duration::from_secs(1);

pub trait FullscreenPlatform {
    fn request_fullscreen(&mut self) -> Result<(), FullscreenError>;
    fn exit_fullscreen(&mut self) -> Result<(), FullscreenError>;
    /// What the platform currently reports
    fn is_fullscreen(&self) -> bool;
}

/// Something that can take interaction focus back after a transition
pub trait FocusTarget {
    fn restore_focus(&mut self) -> Result<(), SessionError>;
}

impl<S: PlaybackSurface> FocusTarget for SessionController<S> {
    fn restore_focus(&mut self) -> Result<(), SessionError> {
        if !self.surface_attached() {
            return Err(SessionError::NotStarted);
        }
        self.surface_mut().focus()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
}

pub struct FullscreenCoordinator<P: FullscreenPlatform> {
    platform: P,
    active: bool,
    /// Last value seen from the platform change channel
    observed: Option<bool>,
    /// When our last successful enter/exit was issued, until the platform agrees
    requested_at: Option<Instant>,
    focus_due: Option<Instant>,
}

impl<P: FullscreenPlatform> FullscreenCoordinator<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            active: false,
            observed: None,
            requested_at: None,
            focus_due: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn focus_pending(&self) -> bool {
        self.focus_due.is_some()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Request exclusive fullscreen for the surface behind `handle`
    pub fn enter(&mut self, handle: Option<SurfaceHandle>, now: Instant) -> Result<Transition, FullscreenError> {
        let handle = handle.ok_or(FullscreenError::NoSurface)?;
        if self.active {
            return Ok(Transition::Entered);
        }

        match self.platform.request_fullscreen() {
            Ok(()) => {
                self.active = true;
                self.requested_at = Some(now);
                self.schedule_focus(now);
                tracing::info!("Entered fullscreen for epoch {}", handle.epoch.value());
                Ok(Transition::Entered)
            }
            Err(e) => {
                tracing::warn!("Fullscreen request rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn exit(&mut self, now: Instant) -> Result<Transition, FullscreenError> {
        if !self.active {
            return Ok(Transition::Exited);
        }

        match self.platform.exit_fullscreen() {
            Ok(()) => {
                self.active = false;
                self.requested_at = Some(now);
                self.schedule_focus(now);
                tracing::info!("Exited fullscreen");
                Ok(Transition::Exited)
            }
            Err(e) => {
                // Trust whatever the platform reports after a failed exit
                self.active = self.platform.is_fullscreen();
                tracing::warn!("Exit fullscreen rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn toggle(&mut self, handle: Option<SurfaceHandle>, now: Instant) -> Result<Transition, FullscreenError> {
        if self.active {
            self.exit(now)
        } else {
            self.enter(handle, now)
        }
    }

    /// Cancel key pressed. Only acts while fullscreen is active.
    pub fn on_escape(&mut self, now: Instant) -> Option<Result<Transition, FullscreenError>> {
        if !self.active {
            return None;
        }
        Some(self.exit(now))
    }

    /// Platform state report, delivered every frame or on change.
    ///
    /// A mismatch with `active` is reconciled to the platform, except while one
    /// of our own requests is still within `PLATFORM_SETTLE_TIMEOUT`. Focus is
    /// only rescheduled when the report itself changed to windowed.
    pub fn on_platform_change(&mut self, fullscreen: bool, now: Instant) {
        let changed = self.observed != Some(fullscreen);
        self.observed = Some(fullscreen);

        if fullscreen == self.active {
            self.requested_at = None;
            return;
        }
        if let Some(at) = self.requested_at {
            if now.saturating_duration_since(at) < PLATFORM_SETTLE_TIMEOUT {
                return;
            }
            tracing::warn!(
                "Platform ignored the fullscreen request, still {}",
                if fullscreen { "fullscreen" } else { "windowed" }
            );
        } else {
            tracing::info!(
                "Fullscreen changed outside the player: {}",
                if fullscreen { "entered" } else { "exited" }
            );
        }

        self.requested_at = None;
        self.active = fullscreen;
        if changed && !fullscreen {
            self.schedule_focus(now);
        }
    }

    /// Run a due focus restoration. Returns true when focus was handed back.
    pub fn poll(&mut self, now: Instant, target: &mut dyn FocusTarget) -> bool {
        match self.focus_due {
            Some(due) if due <= now => {
                self.focus_due = None;
                if let Err(e) = target.restore_focus() {
                    tracing::warn!("Failed to restore surface focus: {}", e);
                }
                true
            }
            _ => false,
        }
    }

    /// Drop a pending focus restoration, e.g. when the surface goes away
    pub fn cancel_focus(&mut self) {
        self.focus_due = None;
    }

    fn schedule_focus(&mut self, now: Instant) {
        // A newer transition replaces any restoration still waiting
        self.focus_due = Some(now + FOCUS_RESTORE_DELAY);
    }
}

/// Fullscreen through the egui root viewport
pub struct ViewportFullscreen {
    ctx: egui::Context,
}

impl ViewportFullscreen {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl FullscreenPlatform for ViewportFullscreen {
    fn request_fullscreen(&mut self) -> Result<(), FullscreenError> {
        self.ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), FullscreenError> {
        self.ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        self.ctx.input(|i| i.viewport().fullscreen.unwrap_or(false))
    }
}

#[cfg(test)]
#[path = "fullscreen_tests.rs"]
mod tests;
