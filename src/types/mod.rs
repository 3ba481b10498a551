//! Configuration types for chime.
//!
//! The configuration is a small JSON file:
//!
//! ```json
//! { "sound": "chime", "looping": false, "enabled": true }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// SoundConfig
// ============================================================================

/// Sound settings of the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Embedded clip name, system sound name or file path
    pub sound: String,
    /// Whether the sound repeats until stopped
    pub looping: bool,
    /// Whether sound is played at all (events are raised either way)
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sound: "chime".to_string(),
            looping: false,
            enabled: true,
        }
    }
}

impl SoundConfig {
    /// Returns a copy using the given sound.
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    /// Returns a copy with looping set.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Returns a copy with sound enabled or disabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.sound.trim().is_empty() {
            return Err("サウンド名を指定してください".to_string());
        }
        if self.sound.len() > 1024 {
            return Err("サウンド名が長すぎます".to_string());
        }
        Ok(())
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読み込めません: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("設定ファイルの形式が不正です: {}", path.display()))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Loads a configuration file, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("ディレクトリを作成できません: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("設定のシリアライズに失敗しました")?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("設定ファイルを書き込めません: {}", path.display()))?;
        Ok(())
    }
}

/// Default location of the configuration file.
///
/// Falls back to the current directory when the platform has no config dir.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chime")
        .join("config.json")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SoundConfig::default();
        assert_eq!(config.sound, "chime");
        assert!(!config.looping);
        assert!(config.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = SoundConfig::default()
            .with_sound("beep")
            .with_looping(true)
            .with_enabled(false);
        assert_eq!(config.sound, "beep");
        assert!(config.looping);
        assert!(!config.enabled);
    }

    #[test]
    fn test_validate_rejects_empty_sound() {
        let config = SoundConfig::default().with_sound("  ");
        assert!(config.validate().is_err());

        let config = SoundConfig::default().with_sound("x".repeat(2000));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SoundConfig = serde_json::from_str(r#"{"looping": true}"#).unwrap();
        assert_eq!(config.sound, "chime");
        assert!(config.looping);
        assert!(config.enabled);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = SoundConfig {
            sound: "beep".to_string(),
            looping: true,
            enabled: false,
        };

        config.save(&path).unwrap();
        assert_eq!(SoundConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SoundConfig::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, SoundConfig::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SoundConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("形式が不正"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"sound": ""}"#).unwrap();
        assert!(SoundConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("chime/config.json"));
    }
}
