//! Fire-and-forget usage notifications
//!
//! Callers never see a failure from here. A missing sink is a no-op.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

impl FavoriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteAction::Add => "add",
            FavoriteAction::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub category: &'static str,
    pub label: String,
    pub value: i32,
}

impl AnalyticsEvent {
    pub fn game_start(title: &str) -> Self {
        Self {
            name: "game_start".to_string(),
            category: "Game",
            label: title.to_string(),
            value: 1,
        }
    }

    pub fn favorite(action: FavoriteAction, title: &str) -> Self {
        Self {
            name: format!("favorite_{}", action.as_str()),
            category: "Engagement",
            label: title.to_string(),
            value: if action == FavoriteAction::Add { 1 } else { -1 },
        }
    }

    pub fn navigation(from: Option<&str>, to: &str) -> Self {
        let label = match from {
            Some(from) => format!("{}_to_{}", from, to),
            None => format!("direct_to_{}", to),
        };
        Self {
            name: "game_navigation".to_string(),
            category: "Navigation",
            label,
            value: 1,
        }
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &AnalyticsEvent);
}

/// Cheap-to-clone handle over an optional sink
#[derive(Clone, Default)]
pub struct Analytics {
    sink: Option<Arc<dyn AnalyticsSink>>,
}

impl Analytics {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn notify_start(&self, title: &str) {
        self.emit(AnalyticsEvent::game_start(title));
    }

    pub fn notify_favorite(&self, action: FavoriteAction, title: &str) {
        self.emit(AnalyticsEvent::favorite(action, title));
    }

    /// Moving from one game to another; `from` is None for a first pick
    pub fn notify_navigation(&self, from: Option<&str>, to: &str) {
        if to.is_empty() {
            return;
        }
        self.emit(AnalyticsEvent::navigation(from, to));
    }

    fn emit(&self, event: AnalyticsEvent) {
        match &self.sink {
            Some(sink) => sink.record(&event),
            None => tracing::trace!("Analytics disabled, dropping {}", event.name),
        }
    }
}

impl std::fmt::Debug for Analytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analytics").field("enabled", &self.is_enabled()).finish()
    }
}

#[derive(Serialize)]
struct JsonlRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a AnalyticsEvent,
}

/// Appends one JSON object per line to a local file
pub struct JsonlSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path, lock: Mutex::new(()) }
    }

    fn append(&self, event: &AnalyticsEvent) -> std::io::Result<()> {
        let record = JsonlRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl AnalyticsSink for JsonlSink {
    fn record(&self, event: &AnalyticsEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!("Dropping analytics event {}: {}", event.name, e);
        }
    }
}

#[cfg(test)]
#[path = "analytics_tests.rs"]
mod tests;
