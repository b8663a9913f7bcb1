//! ElevenLabs text-to-speech provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{Result, TtsError};
use crate::provider::{AudioFormat, SpeechProvider, SpeechRequest};

const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

pub const ELEVENLABS_MAX_INPUT_CHARS: usize = 3000;

/// Provider for the ElevenLabs API
pub struct ElevenLabsProvider {
    base_url: String,
    api_key: String,
    max_input_chars: usize,
    client: Client,
}

impl ElevenLabsProvider {
    pub fn new(api_key: String, base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(ELEVENLABS_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            max_input_chars: ELEVENLABS_MAX_INPUT_CHARS,
            client: Client::new(),
        }
    }

    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = limit;
        self
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs names formats by codec, sample rate and bitrate.
fn output_format(format: AudioFormat) -> Result<&'static str> {
    match format {
        AudioFormat::Mp3 => Ok("mp3_44100_128"),
        AudioFormat::Pcm => Ok("pcm_24000"),
        other => Err(TtsError::ConfigError(format!(
            "ElevenLabs does not support {} output",
            other
        ))),
    }
}

/// Map a non-success response onto the error taxonomy.
///
/// Errors arrive as `{"detail": {"status": "...", "message": "..."}}`, or
/// with `detail` as a bare string for validation failures.
fn classify_error(status: u16, body: &str) -> TtsError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    let code = detail
        .as_ref()
        .and_then(|d| d.get("status"))
        .and_then(|s| s.as_str())
        .map(str::to_string);
    let message = detail
        .as_ref()
        .and_then(|d| match d {
            serde_json::Value::String(s) => Some(s.clone()),
            other => other.get("message").and_then(|m| m.as_str()).map(str::to_string),
        })
        .unwrap_or_else(|| body.to_string());

    let quota = matches!(
        code.as_deref(),
        Some("quota_exceeded") | Some("insufficient_credits") | Some("payment_required")
    ) || status == 402;

    if quota {
        return TtsError::QuotaExhausted { message };
    }

    match status {
        429 => TtsError::RateLimited { retry_after: None },
        503 => TtsError::ServerOverloaded { message },
        _ => TtsError::ApiError {
            message,
            status_code: Some(status),
        },
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let len = request.text.chars().count();
        if len > self.max_input_chars {
            return Err(TtsError::TextTooLong {
                len,
                limit: self.max_input_chars,
            });
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, request.voice);
        let body = SpeechBody {
            text: &request.text,
            model_id: request.model.as_deref().unwrap_or(DEFAULT_MODEL),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", output_format(request.format)?)])
            .header("xi-api-key", &self.api_key)
            .header("Accept", request.format.mime_type())
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &error_text));
        }

        let audio = response.bytes().await.map_err(|e| TtsError::ApiError {
            message: format!("Failed to read audio: {}", e),
            status_code: None,
        })?;

        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "ElevenLabs"
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exceeded_detail() {
        let body = r#"{"detail":{"status":"quota_exceeded","message":"This request exceeds your quota. You have 12 credits remaining."}}"#;
        let err = classify_error(401, body);
        match err {
            TtsError::QuotaExhausted { message } => assert!(message.contains("12 credits")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_payment_required_status() {
        assert!(classify_error(402, "").is_fatal());
    }

    #[test]
    fn test_string_detail() {
        let err = classify_error(422, r#"{"detail":"voice not found"}"#);
        match err {
            TtsError::ApiError {
                message,
                status_code,
            } => {
                assert_eq!(message, "voice not found");
                assert_eq!(status_code, Some(422));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_api_key_is_transient() {
        let body = r#"{"detail":{"status":"invalid_api_key","message":"Invalid API key"}}"#;
        assert!(!classify_error(401, body).is_fatal());
    }

    #[test]
    fn test_output_formats() {
        assert_eq!(output_format(AudioFormat::Mp3).unwrap(), "mp3_44100_128");
        assert_eq!(output_format(AudioFormat::Pcm).unwrap(), "pcm_24000");
        assert!(output_format(AudioFormat::Flac).is_err());
    }

    #[test]
    fn test_accept_header_follows_format() {
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
        assert_eq!(AudioFormat::Pcm.mime_type(), "audio/pcm");
    }
}
