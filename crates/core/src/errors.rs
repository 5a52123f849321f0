use thiserror::Error;

/// Unified error type for the entire portfolio-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Domain variants (missing prices, empty feed, undefined return, bad upload)
/// are never fatal: the calculators hand them back as diagnostics next to
/// whatever rows could be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Portfolio metrics ───────────────────────────────────────────
    #[error("Missing price data for {0}")]
    MissingPriceData(String),

    #[error("Price feed returned no data for: {0}")]
    EmptyFeedResult(String),

    #[error("Return % is undefined for {0} (invested value is zero)")]
    UndefinedReturn(String),

    #[error("No holdings to compute")]
    EmptyPortfolio,

    #[error("Holding validation failed: {0}")]
    ValidationError(String),

    // ── Uploads ─────────────────────────────────────────────────────
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No price provider registered")]
    NoProvider,

    // ── Configuration / File I/O ────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Whether this error should be shown as a warning rather than an info note.
    pub fn is_warning(&self) -> bool {
        !matches!(self, CoreError::UndefinedReturn(_) | CoreError::EmptyPortfolio)
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::MalformedUpload(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors can carry the full URL, API key included.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
