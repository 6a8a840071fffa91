//! Playback surface boundary
//!
//! The session controller only knows a surface as something that is loaded
//! with a URL, eventually posts a ready or error signal, and can take focus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::session::Epoch;
use super::timeout::SourceClass;
use crate::error::SessionError;

/// Headroom over the session's timeout budget before the request gives up on its own
pub const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    Ready,
    Error(String),
}

/// Inbound signal from a surface, tagged with the epoch that loaded it
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSignal {
    pub epoch: Epoch,
    pub kind: SignalKind,
}

pub trait PlaybackSurface {
    /// Instantiate the surface for `url`. Signals for this load must carry `epoch`.
    fn load(&mut self, url: &str, epoch: Epoch, signals: Sender<SurfaceSignal>) -> Result<(), SessionError>;

    fn focus(&mut self) -> Result<(), SessionError>;

    /// Detach listeners; nothing from the previous load may be delivered afterwards
    fn unload(&mut self);

    fn is_loaded(&self) -> bool;
}

/// Surface that fetches the content document on a worker thread and reports
/// the outcome the way an embedding frame reports load/error.
pub struct HttpSurface {
    user_agent: String,
    ctx: Option<egui::Context>,
    cancel: Option<Arc<AtomicBool>>,
}

impl HttpSurface {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ctx: None,
            cancel: None,
        }
    }

    /// Repaint and focus requests go to this viewport
    pub fn with_context(mut self, ctx: egui::Context) -> Self {
        self.ctx = Some(ctx);
        self
    }
}

/// Overall limit for one content request. The controller's timeout budget must always
/// expire first so a slow host ends in TimedOut, never in Failed.
pub fn request_timeout(url: &str) -> Duration {
    SourceClass::classify(url).budget() + REQUEST_TIMEOUT_MARGIN
}

fn fetch_content(url: &str, user_agent: &str) -> Result<(), String> {
    // A refused or unreachable host is still a surface error
    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(request_timeout(url)))
        .timeout_connect(Some(Duration::from_secs(30)))
        .build()
        .new_agent();

    let response = agent
        .get(url)
        .header("User-Agent", user_agent)
        .call()
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }
    Ok(())
}

impl PlaybackSurface for HttpSurface {
    fn load(&mut self, url: &str, epoch: Epoch, signals: Sender<SurfaceSignal>) -> Result<(), SessionError> {
        self.unload();

        if url.trim().is_empty() {
            return Err(SessionError::Surface("content has no URL".to_string()));
        }

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(cancel.clone());

        let url = url.to_string();
        let user_agent = self.user_agent.clone();
        let ctx = self.ctx.clone();
        thread::Builder::new()
            .name(format!("surface-load-{}", epoch.value()))
            .spawn(move || {
                let kind = match fetch_content(&url, &user_agent) {
                    Ok(()) => SignalKind::Ready,
                    Err(e) => SignalKind::Error(e),
                };
                if cancel.load(Ordering::Acquire) {
                    tracing::debug!("Request for epoch {} finished after unload, dropping", epoch.value());
                    return;
                }
                let _ = signals.send(SurfaceSignal { epoch, kind });
                if let Some(ctx) = ctx {
                    ctx.request_repaint();
                }
            })
            .map_err(|e| SessionError::Surface(format!("failed to start content request: {}", e)))?;

        Ok(())
    }

    fn focus(&mut self) -> Result<(), SessionError> {
        if self.cancel.is_none() {
            return Err(SessionError::NotStarted);
        }
        if let Some(ctx) = &self.ctx {
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
        }
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Release);
        }
    }

    fn is_loaded(&self) -> bool {
        self.cancel.is_some()
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
