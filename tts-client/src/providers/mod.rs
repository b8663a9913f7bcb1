//! Speech provider implementations

mod elevenlabs;
pub mod mock;
mod openai;

pub use elevenlabs::ElevenLabsProvider;
pub use mock::{MockOutcome, MockProvider};
pub use openai::OpenAiSpeechProvider;

use crate::config::{ProviderConfig, VoicePreset};
use crate::error::{Result, TtsError};
use crate::provider::SpeechProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    ElevenLabs,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "open-ai" | "openai-compatible" => Ok(Self::OpenAi),
            "elevenlabs" | "eleven-labs" | "eleven_labs" => Ok(Self::ElevenLabs),
            _ => Err(TtsError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::ElevenLabs => "ELEVENLABS_API_KEY",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::ElevenLabs => "ElevenLabs",
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &VoicePreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn SpeechProvider>> {
    let kind = ProviderKind::from_str(&preset.provider)?;
    let api_key = get_api_key(provider_config, kind)?;
    let base_url = provider_config.and_then(|c| c.base_url.as_deref());
    let max_input_chars = provider_config.and_then(|c| c.max_input_chars);

    match kind {
        ProviderKind::OpenAi => {
            let mut provider = OpenAiSpeechProvider::new(api_key, base_url);
            if let Some(limit) = max_input_chars {
                provider = provider.with_max_input_chars(limit);
            }
            Ok(Box::new(provider))
        }
        ProviderKind::ElevenLabs => {
            let mut provider = ElevenLabsProvider::new(api_key, base_url);
            if let Some(limit) = max_input_chars {
                provider = provider.with_max_input_chars(limit);
            }
            Ok(Box::new(provider))
        }
    }
}

/// Get API key from config or environment variable
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(kind.env_var()).map_err(|_| TtsError::MissingApiKey {
        provider: kind.display_name().to_string(),
        env_var: kind.env_var().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!(ProviderKind::from_str("OpenAI").unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            ProviderKind::from_str("elevenlabs").unwrap(),
            ProviderKind::ElevenLabs
        );
        assert!(ProviderKind::from_str("polly").is_err());
    }

    #[test]
    fn test_get_provider_with_configured_key() {
        let preset = VoicePreset {
            provider: "elevenlabs".to_string(),
            voice: "abc".to_string(),
            model: None,
        };
        let config = ProviderConfig {
            api_key: Some("xi-key".to_string()),
            base_url: Some("http://localhost:9999/v1".to_string()),
            max_input_chars: Some(1200),
        };

        let provider = get_provider(&preset, Some(&config)).unwrap();
        assert_eq!(provider.name(), "ElevenLabs");
        assert_eq!(provider.max_input_chars(), 1200);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let preset = VoicePreset {
            provider: "carrier-pigeon".to_string(),
            voice: "coo".to_string(),
            model: None,
        };
        let config = ProviderConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            get_provider(&preset, Some(&config)),
            Err(TtsError::ConfigError(_))
        ));
    }
}
