//! Load timeout budgets by content source

use std::time::Duration;

use crate::models::ContentDescriptor;

/// Source classification derived from the content URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClass {
    /// Block-based programming runtimes (Scratch players)
    VisualProgramming,
    /// Unity WebGL and similar engine runtimes
    HeavyEngine,
    /// Static hosts that usually serve large HTML5 bundles
    LargeBundle,
    Default,
}

// First match wins, checked in this order.
const RULES: &[(SourceClass, &[&str])] = &[
    (SourceClass::VisualProgramming, &["scratch"]),
    (SourceClass::HeavyEngine, &["unity", ".unity3d"]),
    (SourceClass::LargeBundle, &["github.io", "itch.io"]),
];

impl SourceClass {
    pub fn classify(url: &str) -> Self {
        let url = url.to_lowercase();
        RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| url.contains(n)))
            .map(|(class, _)| *class)
            .unwrap_or(SourceClass::Default)
    }

    pub fn budget(&self) -> Duration {
        match self {
            SourceClass::VisualProgramming => Duration::from_secs(150),
            SourceClass::HeavyEngine => Duration::from_secs(200),
            SourceClass::LargeBundle => Duration::from_secs(120),
            SourceClass::Default => Duration::from_secs(100),
        }
    }
}

/// Maximum wait for a surface signal before the session times out
pub fn timeout_budget(descriptor: &ContentDescriptor) -> Duration {
    SourceClass::classify(&descriptor.content_url).budget()
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
