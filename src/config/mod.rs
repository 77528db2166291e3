use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_history_limit() -> usize {
    25
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Override for the dog API endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Show a desktop notification when a new image lands
    #[serde(default)]
    pub notifications: bool,

    /// How many previously fetched images to keep in the history pane
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Accent color override, "#RRGGBB" or "#RGB"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            notifications: false,
            history_limit: default_history_limit(),
            accent: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("doggo");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Zero would drop every fetched image on arrival
        let mut clean_config = self.clone();
        if clean_config.history_limit == 0 {
            clean_config.history_limit = default_history_limit();
        }

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Endpoint to fetch from, falling back to the public API
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(crate::api::DEFAULT_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            endpoint: Some("http://localhost:9999/random".to_string()),
            notifications: true,
            history_limit: 10,
            accent: Some("#FFC107".to_string()),
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.endpoint, deserialized.endpoint);
        assert_eq!(config.notifications, deserialized.notifications);
        assert_eq!(config.history_limit, deserialized.history_limit);
        assert_eq!(config.accent, deserialized.accent);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.endpoint, None);
        assert!(!config.notifications);
        assert_eq!(config.history_limit, default_history_limit());
    }

    #[test]
    fn default_endpoint_is_the_public_api() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint(), crate::api::DEFAULT_ENDPOINT);
    }
}
