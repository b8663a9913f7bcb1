use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Result, TtsError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use when no --voice flag is provided
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Named voice presets for quick access
    #[serde(default)]
    pub presets: HashMap<String, VoicePreset>,

    /// Provider-specific configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_preset() -> String {
    "openai-alloy".to_string()
}

/// A named voice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicePreset {
    /// Provider identifier (openai, elevenlabs)
    pub provider: String,

    /// Voice name or id understood by the provider
    pub voice: String,

    /// Synthesis model, when the provider offers a choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL (for self-hosted or proxied endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Override the provider's per-request character limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_chars: Option<usize>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| TtsError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/cli-programs/tts.toml"))
    }

    /// Get a preset by name
    pub fn get_preset(&self, name: &str) -> Result<&VoicePreset> {
        self.presets
            .get(name)
            .ok_or_else(|| TtsError::InvalidPreset(name.to_string()))
    }

    /// Get provider config by provider name
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut presets = HashMap::new();

        presets.insert(
            "openai-alloy".to_string(),
            VoicePreset {
                provider: "openai".to_string(),
                voice: "alloy".to_string(),
                model: Some("tts-1".to_string()),
            },
        );
        presets.insert(
            "elevenlabs-rachel".to_string(),
            VoicePreset {
                provider: "elevenlabs".to_string(),
                voice: "21m00Tcm4TlvDq8ikWAM".to_string(),
                model: Some("eleven_multilingual_v2".to_string()),
            },
        );

        Self {
            default_preset: default_preset(),
            presets,
            providers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_preset, "openai-alloy");

        let preset = config.get_preset("openai-alloy").unwrap();
        assert_eq!(preset.provider, "openai");
        assert_eq!(preset.voice, "alloy");
        assert_eq!(preset.model.as_deref(), Some("tts-1"));
        assert!(config.presets.contains_key("elevenlabs-rachel"));
    }

    #[test]
    fn test_invalid_preset() {
        let config = Config::default();
        let result = config.get_preset("nonexistent");
        assert!(matches!(result, Err(TtsError::InvalidPreset(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_preset, config.default_preset);
        assert_eq!(parsed.presets.len(), config.presets.len());
    }

    #[test]
    fn test_parse_provider_overrides() {
        let toml_str = r#"
default_preset = "narrator"

[presets.narrator]
provider = "elevenlabs"
voice = "abc123"

[providers.elevenlabs]
api_key = "xi-test"
max_input_chars = 2500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_preset, "narrator");
        let preset = config.get_preset("narrator").unwrap();
        assert!(preset.model.is_none());
        let provider = config.get_provider_config("elevenlabs").unwrap();
        assert_eq!(provider.api_key.as_deref(), Some("xi-test"));
        assert_eq!(provider.max_input_chars, Some(2500));
        assert!(provider.base_url.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path().unwrap();
        assert!(
            path.to_string_lossy()
                .contains(".config/cli-programs/tts.toml")
        );
    }
}
