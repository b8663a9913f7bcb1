use thiserror::Error;

/// How a synthesis failure affects the rest of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The provider will keep refusing requests (e.g. no credits left).
    Fatal,
    /// The failure is confined to this request.
    Transient,
}

#[derive(Error, Debug)]
pub enum TtsError {
    #[error(
        "API key not found for {provider}. Set {env_var} environment variable or add to config."
    )]
    MissingApiKey { provider: String, env_var: String },

    #[error("Provider quota exhausted: {message}")]
    QuotaExhausted { message: String },

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server overloaded (HTTP 503): {message}")]
    ServerOverloaded { message: String },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Text too long for provider: {len} characters (limit {limit})")]
    TextTooLong { len: usize, limit: usize },

    #[error("Provider returned no audio")]
    EmptyAudio,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid voice preset: {0}")]
    InvalidPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl TtsError {
    /// Classify the error for the synthesis loop.
    ///
    /// Only quota exhaustion is fatal; everything else is scoped to the
    /// request that produced it.
    pub fn severity(&self) -> Severity {
        match self {
            TtsError::QuotaExhausted { .. } => Severity::Fatal,
            _ => Severity::Transient,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Operator-facing suggestion for recovering from this error, if any.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            TtsError::QuotaExhausted { .. } => Some(
                "replenish provider credits, or reduce --max-chunks and resume with --start-chunk",
            ),
            TtsError::RateLimited { .. } => Some("increase --delay-ms between chunks"),
            TtsError::ServerOverloaded { .. } => {
                Some("re-run the failed chunks later with --start-chunk")
            }
            TtsError::TextTooLong { .. } => Some("lower --chunk-size below the provider limit"),
            TtsError::MissingApiKey { .. } => Some("configure the provider API key"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
