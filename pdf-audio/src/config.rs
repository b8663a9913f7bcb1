//! pdf-audio configuration: persistent defaults and the per-run configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tts_client::AudioFormat;

use crate::text::DEFAULT_MAX_CHUNK_SIZE;

const DEFAULT_DELAY_MS: u64 = 1000;

/// Defaults stored in ~/.config/cli-programs/pdf-audio.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfAudioConfig {
    /// Voice preset name from tts.toml. None means the tts.toml default.
    #[serde(default)]
    pub voice: Option<String>,

    /// Output audio format
    #[serde(default)]
    pub format: AudioFormat,

    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Pause between provider calls, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

impl Default for PdfAudioConfig {
    fn default() -> Self {
        Self {
            voice: None,
            format: AudioFormat::default(),
            chunk_size: default_chunk_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl PdfAudioConfig {
    /// Get the config file path: ~/.config/cli-programs/pdf-audio.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("cli-programs")
            .join("pdf-audio.toml")
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Parameters fixed for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// First chunk to synthesize, 1-based
    pub start_chunk: usize,
    /// Cap on chunks synthesized; None means through the end
    pub max_chunks: Option<usize>,
    /// Pause after each provider call when more chunks remain
    pub delay: Duration,
    pub voice: String,
    pub model: Option<String>,
    pub format: AudioFormat,
}

impl RunConfig {
    /// Start from the defaults for `input`, writing next to it.
    pub fn new(input: impl Into<PathBuf>, voice: impl Into<String>) -> Self {
        let input = input.into();
        let format = AudioFormat::default();
        Self {
            output: default_output_path(&input, format),
            input,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            start_chunk: 1,
            max_chunks: None,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            voice: voice.into(),
            model: None,
            format,
        }
    }

    /// Reject values that cannot describe a run.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("chunk size must be at least 1".to_string());
        }
        if self.start_chunk == 0 {
            return Err("start chunk is 1-based; use 1 for the first chunk".to_string());
        }
        if self.max_chunks == Some(0) {
            return Err("max chunks must be at least 1 when set".to_string());
        }
        if self.voice.trim().is_empty() {
            return Err("voice must not be empty".to_string());
        }
        Ok(())
    }

    /// Zero-based `[start, end)` range of chunks to synthesize, clamped to `total`.
    pub fn chunk_range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.start_chunk.saturating_sub(1).min(total);
        let end = match self.max_chunks {
            Some(cap) => start.saturating_add(cap).min(total),
            None => total,
        };
        start..end
    }
}

/// `<input stem>.<format extension>` beside the input.
pub fn default_output_path(input: &Path, format: AudioFormat) -> PathBuf {
    input.with_extension(format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PdfAudioConfig::default();
        assert_eq!(config.chunk_size, 2900);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.format, AudioFormat::Mp3);
        assert!(config.voice.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = PdfAudioConfig::config_path();
        assert!(path.ends_with("cli-programs/pdf-audio.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice = "elevenlabs-rachel"
format = "pcm"
chunk_size = 1500
delay_ms = 250
"#;
        let config: PdfAudioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voice.as_deref(), Some("elevenlabs-rachel"));
        assert_eq!(config.format, AudioFormat::Pcm);
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.delay_ms, 250);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: PdfAudioConfig = toml::from_str("").unwrap();
        assert_eq!(config.chunk_size, 2900);
        assert_eq!(config.delay_ms, 1000);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg/pdf-audio.toml");

        let config = PdfAudioConfig {
            voice: Some("narrator".into()),
            chunk_size: 1200,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = PdfAudioConfig::load_from(&path).unwrap();
        assert_eq!(loaded.voice.as_deref(), Some("narrator"));
        assert_eq!(loaded.chunk_size, 1200);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = PdfAudioConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.chunk_size, 2900);
    }

    #[test]
    fn test_default_output_path() {
        let out = default_output_path(Path::new("/books/novel.pdf"), AudioFormat::Mp3);
        assert_eq!(out, PathBuf::from("/books/novel.mp3"));
    }

    #[test]
    fn test_validate() {
        let mut config = RunConfig::new("doc.pdf", "alloy");
        assert!(config.validate().is_ok());

        config.start_chunk = 0;
        assert!(config.validate().is_err());

        config.start_chunk = 1;
        config.max_chunk_size = 0;
        assert!(config.validate().is_err());

        config.max_chunk_size = 10;
        config.max_chunks = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chunk_range() {
        let mut config = RunConfig::new("doc.pdf", "alloy");
        assert_eq!(config.chunk_range(5), 0..5);

        config.start_chunk = 2;
        config.max_chunks = Some(2);
        assert_eq!(config.chunk_range(5), 1..3);

        config.max_chunks = Some(10);
        assert_eq!(config.chunk_range(5), 1..5);

        config.start_chunk = 9;
        assert_eq!(config.chunk_range(5), 5..5);

        config.max_chunks = Some(usize::MAX);
        config.start_chunk = 3;
        assert_eq!(config.chunk_range(5), 2..5);
    }
}
