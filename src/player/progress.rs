//! Simulated load progress
//!
//! The surface only reports ready or error, so progress is an estimate that
//! eases toward each stage's ceiling. Its only guarantees are monotonicity
//! and staying under the active stage's ceiling.

use std::time::Duration;

use super::session::Stage;

/// Interval between progress ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Share of the remaining gap closed per tick
pub const TICK_FRACTION: f32 = 0.1;

/// Smallest step per tick so progress does not stall just below a ceiling
pub const MIN_STEP: f32 = 0.5;

/// Stage target percentage
pub fn ceiling(stage: Stage) -> f32 {
    match stage {
        Stage::Idle => 0.0,
        Stage::Connecting => 15.0,
        Stage::FetchingResources => 45.0,
        Stage::Initializing => 75.0,
        Stage::Ready | Stage::TimedOut | Stage::Failed => 100.0,
    }
}

/// Nominal time spent in a stage before the sequence moves on.
/// `None` for stages that are not time-driven.
pub fn stage_duration(stage: Stage) -> Option<Duration> {
    match stage {
        Stage::Connecting => Some(Duration::from_millis(1000)),
        Stage::FetchingResources => Some(Duration::from_millis(5000)),
        Stage::Initializing => Some(Duration::from_millis(4000)),
        _ => None,
    }
}

/// Stage that follows once `stage` has run its nominal duration
pub fn next_stage(stage: Stage) -> Option<Stage> {
    match stage {
        Stage::Connecting => Some(Stage::FetchingResources),
        Stage::FetchingResources => Some(Stage::Initializing),
        _ => None,
    }
}

/// Move `previous` toward the stage ceiling by `fraction` of the remaining gap.
/// Never exceeds the ceiling and never goes backwards.
pub fn advance(stage: Stage, previous: f32, fraction: f32) -> f32 {
    let target = ceiling(stage);
    if previous >= target {
        return previous;
    }
    let step = ((target - previous) * fraction.clamp(0.0, 1.0)).max(MIN_STEP);
    (previous + step).min(target)
}

/// User-facing line for the loading overlay
pub fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "Click to start playing",
        Stage::Connecting => "Connecting to game server...",
        Stage::FetchingResources => "Loading game resources...",
        Stage::Initializing => "Initializing game engine...",
        Stage::Ready => "Game ready!",
        Stage::TimedOut => "Game is taking longer than expected",
        Stage::Failed => "Unable to load the game",
    }
}

/// Overlay line for a session. Ready is only "ready" once finalization settled.
pub fn overlay_message(stage: Stage, settled: bool) -> &'static str {
    if stage == Stage::Ready && !settled {
        "Finalizing game initialization..."
    } else {
        stage_message(stage)
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
