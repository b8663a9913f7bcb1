//! Speech-synthesis client library for the pdf-audio workspace
//!
//! Provides a unified interface over text-to-speech providers:
//! - OpenAI-compatible `/audio/speech` endpoints
//! - ElevenLabs
//! - A scriptable mock for tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ProviderConfig, VoicePreset};
pub use error::{Result, Severity, TtsError};
pub use provider::{AudioFormat, SpeechProvider, SpeechRequest};
pub use providers::{MockOutcome, MockProvider, ProviderKind, get_provider};
