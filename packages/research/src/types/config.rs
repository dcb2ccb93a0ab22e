//! Configuration for the pipeline.
//!
//! All configuration is explicit and injected; leaf components never read
//! environment variables. `LlmConfig::from_env` exists for binaries and
//! validates once at startup, so a bad credential fails fast instead of
//! per candidate.

use std::time::Duration;

use crate::error::ConfigError;
use crate::security::SecretString;

/// Values that look like an unfilled template rather than a real key.
const PLACEHOLDER_MARKERS: &[&str] = &["changeme", "paste", "your-api-key", "xxxx"];

/// Connection details for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token for the endpoint.
    pub api_key: SecretString,

    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Model identifiers tried in order; the first success wins.
    pub models: Vec<String>,

    /// Hard per-call timeout.
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create a config for one model with default endpoint and timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            base_url: "https://api.openai.com/v1".to_string(),
            models: vec![model.into()],
            timeout: Duration::from_secs(300),
        }
    }

    /// Set a custom base URL (gateways, proxies, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Append a fallback model, tried when the ones before it fail.
    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.models.push(model.into());
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read from `LLM_API_KEY`, `LLM_MODEL`, and optionally
    /// `LLM_BASE_URL`, `LLM_FALLBACK_MODEL`, `LLM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            std::env::var("LLM_API_KEY").map_err(|_| ConfigError::Missing { name: "LLM_API_KEY" })?;
        validate_credential("LLM_API_KEY", &api_key)?;

        let model =
            std::env::var("LLM_MODEL").map_err(|_| ConfigError::Missing { name: "LLM_MODEL" })?;

        let mut config = Self::new(api_key, model);

        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(fallback) = std::env::var("LLM_FALLBACK_MODEL") {
            config = config.with_fallback_model(fallback);
        }
        if let Ok(raw) = std::env::var("LLM_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LLM_TIMEOUT_SECS: '{raw}'")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn validate_credential(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Missing { name });
    }
    let lower = trimmed.to_ascii_lowercase();
    if PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m)) {
        return Err(ConfigError::Placeholder { name });
    }
    Ok(())
}

/// Knobs for the content fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the header-only content-type probe.
    pub probe_timeout: Duration,

    /// Timeout for full HTML and PDF downloads.
    pub page_timeout: Duration,

    /// Below this many characters of HTML text, the fetcher hunts for an
    /// on-page PDF link as a supplementary source.
    pub min_html_chars: usize,

    /// Upper bound on extracted text kept per document.
    pub max_text_chars: usize,

    /// Sent on every request. Some congress sites block non-browser agents.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(15),
            min_html_chars: 1000,
            max_text_chars: 35_000,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl FetchConfig {
    /// Set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the full-download timeout.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Set the short-page threshold that triggers PDF-link hunting.
    pub fn with_min_html_chars(mut self, chars: usize) -> Self {
        self.min_html_chars = chars;
        self
    }

    /// Set the extracted-text bound.
    pub fn with_max_text_chars(mut self, chars: usize) -> Self {
        self.max_text_chars = chars;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Page retention policy for PDF extraction.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// Pages always kept from the front, for structural context.
    pub keep_first: usize,

    /// Stop once this many pages have been retained.
    pub page_cap: usize,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            keep_first: 2,
            page_cap: 15,
        }
    }
}

impl PdfOptions {
    /// Set how many leading pages are always kept.
    pub fn with_keep_first(mut self, pages: usize) -> Self {
        self.keep_first = pages;
        self
    }

    /// Set the retained-page cap.
    pub fn with_page_cap(mut self, cap: usize) -> Self {
        self.page_cap = cap;
        self
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Raw results requested per query, as a multiple of the wanted limit.
    /// Survives the heavy downstream rejection rate.
    pub overfetch_factor: usize,

    /// Candidates processed at once. 1 means sequential, which preserves
    /// search-result order in the report.
    pub concurrency: usize,

    /// Character budget for text sent to the classifier.
    pub classify_max_chars: usize,

    /// Content fetcher settings.
    pub fetch: FetchConfig,

    /// PDF page retention settings.
    pub pdf: PdfOptions,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 10,
            concurrency: 1,
            classify_max_chars: 30_000,
            fetch: FetchConfig::default(),
            pdf: PdfOptions::default(),
        }
    }
}

impl ResearchConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the over-fetch factor.
    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    /// Process up to `n` candidates concurrently. Results then arrive in
    /// completion order, which is not deterministic across runs.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Set the classifier text budget.
    pub fn with_classify_max_chars(mut self, chars: usize) -> Self {
        self.classify_max_chars = chars;
        self
    }

    /// Set fetcher settings.
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Set PDF retention settings.
    pub fn with_pdf(mut self, pdf: PdfOptions) -> Self {
        self.pdf = pdf;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_validation_rejects_placeholders() {
        assert!(validate_credential("K", "sk-real-key-123").is_ok());
        assert!(matches!(
            validate_credential("K", "PASTE_YOUR_KEY_HERE"),
            Err(ConfigError::Placeholder { .. })
        ));
        assert!(matches!(
            validate_credential("K", "  "),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn concurrency_floor_is_one() {
        let config = ResearchConfig::new().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }
}
