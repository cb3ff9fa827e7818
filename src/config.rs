use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BotError, Result};

const APP_DIR: &str = ".hotel-bot";
const CONFIG_FILE: &str = "config.json";
const SPELL_CORRECTION_ENV: &str = "IS_SPELL_CORRECTION_ENABLED";

/// Bot configuration loaded from ~/.hotel-bot/config.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Recognitions scoring below this are treated as "no intent"
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Score an intent needs to interrupt a dialog that awaits input
    #[serde(default = "default_interrupt_threshold")]
    pub interrupt_threshold: f64,
    /// Run the text corrector before intent recognition
    #[serde(default)]
    pub spell_correction_enabled: bool,
    /// Priority of "keep waiting" while a dialog awaits input
    #[serde(default)]
    pub resume_priority: i32,
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Simulated latency for the sample hotel store
    #[serde(default)]
    pub store_latency_ms: u64,
    /// Word replacements used by the dictionary corrector
    #[serde(default)]
    pub corrections: HashMap<String, String>,
}

fn default_confidence_threshold() -> f64 {
    0.5
}

fn default_interrupt_threshold() -> f64 {
    0.9
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            interrupt_threshold: default_interrupt_threshold(),
            spell_correction_enabled: false,
            resume_priority: 0,
            session_dir: None,
            log_dir: None,
            store_latency_ms: 0,
            corrections: HashMap::new(),
        }
    }
}

impl BotConfig {
    /// Load config from the standard location, or from `path` when given.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = Self::load_from_path(&config_path)?;
        config.apply_env_overrides(std::env::var(SPELL_CORRECTION_ENV).ok().as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                BotError::Config(format!("Failed to read config file: {}", e))
            })?;
            let config: BotConfig = serde_json::from_str(&content).map_err(|e| {
                BotError::Config(format!("Failed to parse config JSON: {}", e))
            })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    fn apply_env_overrides(&mut self, spell_correction: Option<&str>) {
        if let Some(value) = spell_correction {
            self.spell_correction_enabled = value.eq_ignore_ascii_case("true");
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(BotError::Config(format!(
                "confidenceThreshold must be between 0 and 1, got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.interrupt_threshold) {
            return Err(BotError::Config(format!(
                "interruptThreshold must be between 0 and 1, got {}",
                self.interrupt_threshold
            )));
        }
        Ok(())
    }

    /// Base directory for all bot state (~/.hotel-bot)
    pub fn app_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Get the standard config file path
    pub fn config_path() -> PathBuf {
        Self::app_dir().join(CONFIG_FILE)
    }

    pub fn session_dir(&self) -> PathBuf {
        self.session_dir
            .clone()
            .unwrap_or_else(|| Self::app_dir().join("sessions"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| Self::app_dir().join("logs"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.interrupt_threshold, 0.9);
        assert!(!config.spell_correction_enabled);
        assert_eq!(config.resume_priority, 0);
        assert_eq!(config.store_latency_ms, 0);
        assert!(config.corrections.is_empty());
    }

    #[test]
    fn test_load_from_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{
                "confidenceThreshold": 0.7,
                "interruptThreshold": 0.8,
                "spellCorrectionEnabled": true,
                "resumePriority": 2,
                "sessionDir": "/tmp/bot-sessions",
                "corrections": {{"hotles": "hotels"}}
            }}"#
        )
        .unwrap();

        let config = BotConfig::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.interrupt_threshold, 0.8);
        assert!(config.spell_correction_enabled);
        assert_eq!(config.resume_priority, 2);
        assert_eq!(config.session_dir(), PathBuf::from("/tmp/bot-sessions"));
        assert_eq!(config.corrections.get("hotles"), Some(&"hotels".to_string()));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/config.json");
        let config = BotConfig::load_from_path(&path).unwrap();
        assert_eq!(config.confidence_threshold, 0.5);
    }

    #[test]
    fn test_load_invalid_json_returns_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "not valid json").unwrap();

        let result = BotConfig::load_from_path(temp_file.path());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_env_override_enables_spell_correction() {
        let mut config = BotConfig::default();
        config.apply_env_overrides(Some("TRUE"));
        assert!(config.spell_correction_enabled);

        config.apply_env_overrides(Some("no"));
        assert!(!config.spell_correction_enabled);
    }

    #[test]
    fn test_env_override_absent_keeps_file_value() {
        let mut config = BotConfig {
            spell_correction_enabled: true,
            ..Default::default()
        };
        config.apply_env_overrides(None);
        assert!(config.spell_correction_enabled);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = BotConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BotConfig {
            interrupt_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_dirs_under_app_dir() {
        let config = BotConfig::default();
        assert!(config.session_dir().ends_with(".hotel-bot/sessions"));
        assert!(config.log_dir().ends_with(".hotel-bot/logs"));
        assert!(BotConfig::config_path().ends_with(".hotel-bot/config.json"));
    }
}
