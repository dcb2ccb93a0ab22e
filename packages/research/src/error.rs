//! Typed errors for the research pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can decide
//! per concern whether to log, skip the candidate, or abort.

use thiserror::Error;

/// Configuration problems, surfaced once at startup before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("missing configuration: {name} is not set")]
    Missing { name: &'static str },

    /// A credential still carries its placeholder value
    #[error("placeholder configuration: {name} has not been filled in")]
    Placeholder { name: &'static str },

    /// A value was set but could not be parsed
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from the web-search backend. A failed query is skipped, not fatal.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Request could not be sent or completed
    #[error("search request failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backend answered with a non-success status
    #[error("search backend returned HTTP {status}")]
    BadStatus { status: u16 },

    /// Response body was not the expected JSON shape
    #[error("could not decode search response: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Per-candidate fetch failures. These exclude the candidate, never the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The page could not be downloaded
    #[error("connection failed: {url}")]
    ConnectionFailed { url: String },

    /// The host refused us (401/403)
    #[error("access denied ({status}): {url}")]
    AccessDenied { url: String, status: u16 },

    /// Nothing readable came out of the page or its linked PDF
    #[error("no text content: {url}")]
    NoContent { url: String },
}

/// Errors from language-model calls.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Pre-check failure: the query term never appears in the document,
    /// so no model call was made
    #[error("query term '{term}' not found in document")]
    TermNotFound { term: String },

    /// Transport failure talking to the model endpoint
    #[error("LLM request failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Endpoint answered with a non-success status
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The model returned no usable text
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// Structured-mode response was not valid JSON of the expected shape
    #[error("could not parse LLM response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every model in the fallback chain failed
    #[error("all models failed: {}", attempts.join("; "))]
    AllModelsFailed { attempts: Vec<String> },
}

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for LLM operations.
pub type LlmResult<T> = std::result::Result<T, LlmError>;
