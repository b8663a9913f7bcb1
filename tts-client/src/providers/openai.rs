//! OpenAI-compatible speech provider
//!
//! Targets the `/audio/speech` endpoint. Works against OpenAI itself and
//! self-hosted servers that mirror the same API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::provider::{SpeechProvider, SpeechRequest};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "tts-1";

/// OpenAI rejects inputs longer than this
pub const OPENAI_MAX_INPUT_CHARS: usize = 4096;

/// Provider for OpenAI-compatible speech APIs
pub struct OpenAiSpeechProvider {
    base_url: String,
    api_key: String,
    max_input_chars: usize,
    client: Client,
}

impl OpenAiSpeechProvider {
    /// Create a new provider; `base_url` defaults to the public OpenAI API
    pub fn new(api_key: String, base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(OPENAI_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            max_input_chars: OPENAI_MAX_INPUT_CHARS,
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
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Map a non-success response onto the error taxonomy.
fn classify_error(status: u16, body: &str, retry_after: Option<u64>) -> TtsError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();

    let quota = parsed.as_ref().is_some_and(|r| {
        r.error.code.as_deref() == Some("insufficient_quota")
            || r.error.kind.as_deref() == Some("insufficient_quota")
    });
    let message = parsed
        .map(|r| r.error.message)
        .unwrap_or_else(|| body.to_string());

    if quota {
        return TtsError::QuotaExhausted { message };
    }

    match status {
        429 => TtsError::RateLimited { retry_after },
        503 => TtsError::ServerOverloaded { message },
        _ => TtsError::ApiError {
            message,
            status_code: Some(status),
        },
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let len = request.text.chars().count();
        if len > self.max_input_chars {
            return Err(TtsError::TextTooLong {
                len,
                limit: self.max_input_chars,
            });
        }

        let body = SpeechBody {
            model: request.model.as_deref().unwrap_or(DEFAULT_MODEL),
            input: &request.text,
            voice: &request.voice,
            response_format: request.format.extension(),
        };

        let url = format!("{}/audio/speech", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &error_text, retry_after));
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
        "OpenAI"
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::provider::AudioFormat;

    #[test]
    fn test_insufficient_quota_is_fatal() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let err = classify_error(429, body, None);
        assert!(matches!(err, TtsError::QuotaExhausted { .. }));
        assert_eq!(err.severity(), Severity::Fatal);
    }

    #[test]
    fn test_plain_rate_limit_is_transient() {
        let body = r#"{"error":{"message":"Rate limit reached","type":"requests","code":"rate_limit_exceeded"}}"#;
        let err = classify_error(429, body, Some(20));
        assert!(matches!(
            err,
            TtsError::RateLimited {
                retry_after: Some(20)
            }
        ));
        assert_eq!(err.severity(), Severity::Transient);
    }

    #[test]
    fn test_unparseable_error_body() {
        let err = classify_error(500, "gateway exploded", None);
        match err {
            TtsError::ApiError {
                message,
                status_code,
            } => {
                assert_eq!(message, "gateway exploded");
                assert_eq!(status_code, Some(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_overloaded() {
        let err = classify_error(503, "", None);
        assert!(matches!(err, TtsError::ServerOverloaded { .. }));
    }

    #[tokio::test]
    async fn test_rejects_oversized_input_without_request() {
        let provider = OpenAiSpeechProvider::new("sk-test".into(), Some("http://127.0.0.1:9"))
            .with_max_input_chars(5);
        let request = SpeechRequest {
            text: "too long for this".into(),
            voice: "alloy".into(),
            model: None,
            format: AudioFormat::Mp3,
        };
        let err = provider.synthesize(&request).await.unwrap_err();
        assert!(matches!(err, TtsError::TextTooLong { len: 17, limit: 5 }));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = OpenAiSpeechProvider::new("k".into(), Some("http://localhost:8000/v1/"));
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
        assert_eq!(provider.max_input_chars(), OPENAI_MAX_INPUT_CHARS);
    }
}
