//! Embedded content player
//!
//! Session lifecycle, simulated load feedback, timeout policy and fullscreen
//! coordination for the playback surface.

mod fullscreen;
pub mod progress;
mod session;
mod surface;
pub mod timeout;
mod timers;

// Re-export public types
pub use fullscreen::{
    FocusTarget,
    FullscreenCoordinator,
    FullscreenPlatform,
    Transition,
    ViewportFullscreen,
    FOCUS_RESTORE_DELAY,
    PLATFORM_SETTLE_TIMEOUT,
};
pub use session::{
    Epoch,
    Session,
    SessionController,
    SessionUpdate,
    Stage,
    SurfaceHandle,
    FINALIZATION_DELAY,
};
pub use surface::{HttpSurface, PlaybackSurface, SignalKind, SurfaceSignal};
pub use timers::{FiredTimer, TimerId, TimerQueue};
