//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local catalog file; empty means the bundled catalog
    #[serde(default)]
    pub catalog_path: String,
    /// Remote catalog, takes precedence over `catalog_path` when set
    #[serde(default)]
    pub catalog_url: String,
    #[serde(default = "default_true")]
    pub enable_analytics: bool,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    // Open settled content in an external browser
    #[serde(default)]
    pub launch_browser: bool,
    #[serde(default)]
    pub browser_command: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub last_game_slug: String,
}

fn default_font_size() -> u32 { 14 }
fn default_true() -> bool { true }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: String::new(),
            catalog_url: String::new(),
            enable_analytics: true,
            dark_mode: true,
            font_size: 14,
            launch_browser: false,
            browser_command: String::new(),
            user_agent: default_user_agent(),
            last_game_slug: String::new(),
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        config_dir().join("config.json")
    }

    pub fn load() -> Self {
        let path = Self::config_path();

        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring corrupt config {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
            }
        }

        Self::default()
    }

    pub fn save(&self) {
        let path = Self::config_path();
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    tracing::warn!("Failed to save config {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::warn!("Failed to encode config: {}", e),
        }
    }

    /// Command used to open content outside the app
    pub fn effective_browser(&self) -> String {
        if !self.browser_command.trim().is_empty() {
            return self.browser_command.trim().to_string();
        }
        if cfg!(target_os = "windows") {
            "explorer".to_string()
        } else if cfg!(target_os = "macos") {
            "open".to_string()
        } else {
            "xdg-open".to_string()
        }
    }
}

/// Per-user application directory, created on first use
pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("arcade_shelf");
    fs::create_dir_all(&path).ok();
    path
}

pub fn favorites_path() -> PathBuf {
    config_dir().join("favorites.json")
}

pub fn analytics_path() -> PathBuf {
    config_dir().join("analytics.jsonl")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
