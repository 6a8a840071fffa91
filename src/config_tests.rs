//! Tests for configuration defaults

#[cfg(test)]
mod tests {
    use crate::config::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "catalog_url": "https://c.test/g.json" }"#).unwrap();
        assert_eq!(config.catalog_url, "https://c.test/g.json");
        assert!(config.dark_mode);
        assert!(config.enable_analytics);
        assert_eq!(config.font_size, 14);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_effective_browser_prefers_configured_command() {
        let mut config = AppConfig::default();
        assert!(!config.effective_browser().is_empty());

        config.browser_command = "  firefox ".to_string();
        assert_eq!(config.effective_browser(), "firefox");
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::default();
        config.last_game_slug = "tower-runner".to_string();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
