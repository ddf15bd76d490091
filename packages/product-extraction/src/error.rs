//! Typed errors for the product extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Only [`ExtractionError`] ever reaches a caller. [`StrategyError`] and
//! [`CrawlError`] are recovered inside the orchestrator by moving on to the
//! next strategy.

use thiserror::Error;

/// Errors surfaced to callers of the orchestrator.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Missing or malformed URL; no strategy was attempted.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Every strategy, including the URL fallback, failed.
    #[error(
        "could not extract a product from {supplier}. \
         Verify the URL points to a valid product page"
    )]
    ExtractionFailed { supplier: String },

    /// The caller cancelled the request.
    #[error("operation cancelled")]
    Cancelled,
}

impl ExtractionError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Errors from a single strategy attempt. Never surfaced to the caller.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The strategy could not even attempt extraction.
    #[error("strategy unavailable: {0}")]
    Unavailable(String),

    /// The strategy ran but produced no name of sufficient quality.
    #[error("no usable product data")]
    NoUsableData,

    /// Fetching the page failed.
    #[error("fetch failed: {0}")]
    Fetch(CrawlError),

    /// The attempt exceeded its allotted wait.
    #[error("strategy timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl From<CrawlError> for StrategyError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::NotConfigured(what) => StrategyError::Unavailable(what),
            CrawlError::Security(e) => StrategyError::Unavailable(e.to_string()),
            other => StrategyError::Fetch(other),
        }
    }
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Security validation failed
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success status from the target or the render service
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// External service is not configured (e.g. missing API key)
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The response carried no usable content
    #[error("empty content for: {url}")]
    EmptyContent { url: String },

    /// Connection timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

impl CrawlError {
    /// Wrap a reqwest error, keeping timeouts distinguishable.
    pub fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            CrawlError::Timeout {
                url: url.to_string(),
            }
        } else {
            CrawlError::Http(Box::new(err))
        }
    }
}

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, internal IPs)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for strategy attempts.
pub type StrategyResult<T> = std::result::Result<T, StrategyError>;

/// Result type alias for fetch operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
