//! Web searcher trait and the SearxNG-backed live implementation.
//!
//! The pipeline only needs one operation from a search backend: text
//! search with a result cap and an optional freshness window. Keeping it
//! behind a trait lets tests script hits without touching the network.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::{SearchError, SearchResult};
use crate::types::source::SearchHit;

/// Freshness window passed through to the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// No freshness constraint.
    #[default]
    Any,
    /// Roughly the last twelve months.
    Year,
    /// Roughly the last month.
    Month,
}

impl TimeRange {
    /// Backend query-parameter value, if the range constrains anything.
    pub fn as_query_param(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Year => Some("year"),
            Self::Month => Some("month"),
        }
    }
}

/// One search call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Full query string, including any `site:` restrictions.
    pub query: String,

    /// Raw result cap for this call.
    pub max_results: usize,

    /// Freshness window.
    pub time_range: TimeRange,
}

/// A text-search backend.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Run one query and return raw hits. No pagination beyond
    /// `max_results`, no freshness guarantee beyond `time_range`.
    async fn search(&self, request: &SearchRequest) -> SearchResult<Vec<SearchHit>>;
}

/// SearxNG-backed searcher using the instance's JSON API.
pub struct SearxSearcher {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearxResponse {
    results: Vec<SearxHit>,
}

#[derive(Debug, Deserialize)]
struct SearxHit {
    url: String,
    title: String,
    #[serde(default)]
    content: Option<String>,
}

impl SearxSearcher {
    /// Create a searcher against a SearxNG instance.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl WebSearcher for SearxSearcher {
    async fn search(&self, request: &SearchRequest) -> SearchResult<Vec<SearchHit>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let max_results = request.max_results.to_string();

        let mut params = vec![
            ("q", request.query.as_str()),
            ("format", "json"),
            ("max_results", max_results.as_str()),
        ];
        if let Some(range) = request.time_range.as_query_param() {
            params.push(("time_range", range));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: SearxResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(Box::new(e)))?;

        // Hits with unparseable URLs are useless downstream; drop them here.
        let hits = body
            .results
            .into_iter()
            .filter_map(|r| {
                let url = Url::parse(&r.url).ok()?;
                let mut hit = SearchHit::new(url, r.title);
                if let Some(snippet) = r.content {
                    hit = hit.with_snippet(snippet);
                }
                Some(hit)
            })
            .take(request.max_results)
            .collect();

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_params() {
        assert_eq!(TimeRange::Any.as_query_param(), None);
        assert_eq!(TimeRange::Year.as_query_param(), Some("year"));
        assert_eq!(TimeRange::Month.as_query_param(), Some("month"));
    }
}
