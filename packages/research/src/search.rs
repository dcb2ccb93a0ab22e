//! Search-stage aggregation: runs the planned queries, over-fetches,
//! deduplicates run-wide, and applies the block list before any candidate
//! reaches the gatekeeper.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::gatekeeper::FilterRules;
use crate::traits::searcher::{SearchRequest, TimeRange, WebSearcher};
use crate::types::analysis::SkippedCandidate;
use crate::types::source::SearchHit;

/// What one collection pass produced: surviving hits plus the hits the
/// block list removed, with reasons.
#[derive(Debug, Default)]
pub struct SearchBatch {
    pub hits: Vec<SearchHit>,
    pub skipped: Vec<SkippedCandidate>,
}

/// Runs planned queries against a [`WebSearcher`] and cleans the results.
pub struct SearchClient<S> {
    searcher: S,
    rules: Arc<FilterRules>,
    overfetch_factor: usize,
}

impl<S: WebSearcher> SearchClient<S> {
    /// Wrap a searcher with the shared rule set.
    pub fn new(searcher: S, rules: Arc<FilterRules>, overfetch_factor: usize) -> Self {
        Self {
            searcher,
            rules,
            overfetch_factor: overfetch_factor.max(1),
        }
    }

    /// Run every query in order until `limit` clean hits are collected.
    ///
    /// Deduplication is by exact URL across all queries of the run. A
    /// query that errors is logged and skipped; if every query fails the
    /// batch is simply empty.
    pub async fn collect(
        &self,
        queries: &[String],
        limit: usize,
        time_range: TimeRange,
    ) -> SearchBatch {
        let mut batch = SearchBatch::default();
        let mut seen: HashSet<String> = HashSet::new();

        for query in queries {
            if batch.hits.len() >= limit {
                break;
            }

            let request = SearchRequest {
                query: query.clone(),
                max_results: limit.saturating_mul(self.overfetch_factor),
                time_range,
            };

            let found = match self.searcher.search(&request).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(query = %query, error = %e, "search query failed, skipping");
                    continue;
                }
            };

            debug!(query = %query, raw = found.len(), "search results");

            for hit in found {
                if batch.hits.len() >= limit {
                    break;
                }
                if !seen.insert(hit.url.as_str().to_string()) {
                    continue;
                }

                let host = hit.url.host_str().unwrap_or("");
                if self.rules.host_banned(host) {
                    batch.skipped.push(SkippedCandidate {
                        url: hit.url.to_string(),
                        reason: format!("banned domain: {host}"),
                    });
                    continue;
                }
                if self.rules.title_noisy(&hit.title) {
                    batch.skipped.push(SkippedCandidate {
                        url: hit.url.to_string(),
                        reason: "noise token in title".to_string(),
                    });
                    continue;
                }

                batch.hits.push(hit);
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSearcher;

    fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit::from_url(url, title).unwrap()
    }

    #[tokio::test]
    async fn duplicate_urls_across_queries_collapse() {
        let searcher = MockSearcher::new().with_default_hits(vec![
            hit("https://a.example.org/abstract", "EHA abstract"),
            hit("https://a.example.org/abstract", "EHA abstract again"),
        ]);
        let client = SearchClient::new(searcher, Arc::new(FilterRules::new()), 3);

        let queries = vec!["q one".to_string(), "q two".to_string()];
        let batch = client.collect(&queries, 10, TimeRange::Any).await;

        assert_eq!(batch.hits.len(), 1);
        assert_eq!(batch.hits[0].url.as_str(), "https://a.example.org/abstract");
    }

    #[tokio::test]
    async fn blocked_hosts_and_noisy_titles_are_recorded() {
        let searcher = MockSearcher::new().with_default_hits(vec![
            hit("https://www.webmd.com/ms-overview", "MS overview"),
            hit("https://ok.example.org/page", "Build a scraper with ChatGPT"),
            hit("https://ok.example.org/program", "Scientific program"),
        ]);
        let client = SearchClient::new(searcher, Arc::new(FilterRules::new()), 3);

        let batch = client
            .collect(&["q".to_string()], 10, TimeRange::Any)
            .await;

        assert_eq!(batch.hits.len(), 1);
        assert_eq!(batch.skipped.len(), 2);
        assert!(batch.skipped[0].reason.contains("banned"));
        assert!(batch.skipped[1].reason.contains("noise"));
    }

    #[tokio::test]
    async fn failed_queries_are_skipped_not_fatal() {
        let searcher = MockSearcher::new()
            .failing_on("broken query")
            .with_hits("good query", vec![hit("https://ok.example.org/a", "A")]);
        let client = SearchClient::new(searcher, Arc::new(FilterRules::new()), 3);

        let queries = vec!["broken query".to_string(), "good query".to_string()];
        let batch = client.collect(&queries, 10, TimeRange::Any).await;

        assert_eq!(batch.hits.len(), 1);
    }

    #[tokio::test]
    async fn all_queries_failing_yields_empty_batch() {
        let searcher = MockSearcher::new().failing_on("q");
        let client = SearchClient::new(searcher, Arc::new(FilterRules::new()), 3);

        let batch = client
            .collect(&["q".to_string()], 10, TimeRange::Any)
            .await;
        assert!(batch.hits.is_empty());
        assert!(batch.skipped.is_empty());
    }

    #[tokio::test]
    async fn limit_caps_collected_hits() {
        let searcher = MockSearcher::new().with_default_hits(vec![
            hit("https://x.example.org/1", "one"),
            hit("https://x.example.org/2", "two"),
            hit("https://x.example.org/3", "three"),
        ]);
        let client = SearchClient::new(searcher, Arc::new(FilterRules::new()), 3);

        let batch = client
            .collect(&["q".to_string()], 2, TimeRange::Any)
            .await;
        assert_eq!(batch.hits.len(), 2);
    }
}
