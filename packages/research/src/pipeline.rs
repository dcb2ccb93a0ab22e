//! The orchestrator: plan → search → gate → fetch → classify.
//!
//! Failures are local to one candidate and never abort siblings. The
//! top-level runs return a [`ResearchReport`], never an error: no sources,
//! all blocked, and nothing relevant are all expected outcomes.

use std::sync::Arc;

use futures::{stream, StreamExt};
use tracing::{debug, info, warn};

use crate::classify::{Classification, Classifier};
use crate::error::LlmError;
use crate::gatekeeper::FilterRules;
use crate::planner;
use crate::search::SearchClient;
use crate::traits::fetcher::Fetcher;
use crate::traits::llm::{LanguageModel, ModelChain};
use crate::traits::searcher::{TimeRange, WebSearcher};
use crate::types::analysis::{AnalysisResult, ResearchReport, SkippedCandidate};
use crate::types::config::ResearchConfig;
use crate::types::source::SearchHit;

/// Which model mode a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// Free-text triage: not relevant vs. titled summary.
    Classify,
    /// Structured extraction: sample record + generated parser.
    Extract,
}

enum CandidateOutcome {
    Analyzed(AnalysisResult),
    Skipped(SkippedCandidate),
}

/// Sequences the whole pipeline over injected collaborators.
pub struct Orchestrator<S, F> {
    config: ResearchConfig,
    rules: Arc<FilterRules>,
    search: SearchClient<S>,
    fetcher: F,
    classifier: Classifier,
}

impl<S: WebSearcher, F: Fetcher> Orchestrator<S, F> {
    /// Wire up a pipeline. `models` is the ordered fallback chain of
    /// model ids used for every call against `llm`.
    pub fn new(
        config: ResearchConfig,
        searcher: S,
        fetcher: F,
        llm: Arc<dyn LanguageModel>,
        models: Vec<String>,
    ) -> Self {
        let rules = Arc::new(FilterRules::new());
        let chain = ModelChain::new(llm, models);
        let classifier = Classifier::new(chain, config.classify_max_chars);
        let search = SearchClient::new(searcher, rules.clone(), config.overfetch_factor);

        Self {
            config,
            rules,
            search,
            fetcher,
            classifier,
        }
    }

    /// Discover, fetch, and triage sources for a topic. Free-text mode.
    pub async fn run_research(
        &self,
        topic: &str,
        max_sites: usize,
        time_range: TimeRange,
    ) -> ResearchReport {
        self.run(topic, max_sites, time_range, RunMode::Classify)
            .await
    }

    /// Same discovery front end, but structured extraction mode.
    pub async fn run_extraction(&self, topic: &str, max_sites: usize) -> ResearchReport {
        self.run(topic, max_sites, TimeRange::Any, RunMode::Extract)
            .await
    }

    async fn run(
        &self,
        topic: &str,
        max_sites: usize,
        time_range: TimeRange,
        mode: RunMode,
    ) -> ResearchReport {
        let mut report = ResearchReport::default();

        let topic = topic.trim();
        if topic.is_empty() || max_sites == 0 {
            return report;
        }

        // Hint discovery fails open; the plan works without it.
        let hints = planner::discover_hint_domains(self.classifier.chain(), topic).await;
        if !hints.is_empty() {
            info!(topic = %topic, hints = ?hints, "discovered society domains");
        }

        let queries = planner::plan_queries(topic, &hints);
        report.queries_planned = queries.len();

        let batch = self.search.collect(&queries, max_sites, time_range).await;
        report.skipped.extend(batch.skipped);
        report.hits_considered = batch.hits.len();

        if batch.hits.is_empty() {
            info!(topic = %topic, "no candidate sources found");
            return report;
        }

        let outcomes: Vec<CandidateOutcome> = if self.config.concurrency <= 1 {
            // Sequential path: report order follows search order.
            let mut outcomes = Vec::with_capacity(batch.hits.len());
            for hit in &batch.hits {
                outcomes.push(self.process_candidate(hit, topic, mode).await);
            }
            outcomes
        } else {
            // Bounded worker pool: results land in completion order.
            stream::iter(
                batch
                    .hits
                    .iter()
                    .map(|hit| self.process_candidate(hit, topic, mode)),
            )
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await
        };

        for outcome in outcomes {
            match outcome {
                CandidateOutcome::Analyzed(result) => report.results.push(result),
                CandidateOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }

        info!(
            topic = %topic,
            analyzed = report.results.len(),
            relevant = report.relevant_count(),
            skipped = report.skipped.len(),
            "research run complete"
        );

        report
    }

    async fn process_candidate(
        &self,
        hit: &SearchHit,
        topic: &str,
        mode: RunMode,
    ) -> CandidateOutcome {
        let url = hit.url.to_string();

        let verdict = self.rules.evaluate(hit.url.as_str());
        if !verdict.accepted {
            debug!(url = %url, reason = %verdict.reason, "gatekeeper rejected");
            return CandidateOutcome::Skipped(SkippedCandidate {
                url,
                reason: verdict.reason,
            });
        }

        let document = match self.fetcher.fetch(&hit.url, topic).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(url = %url, error = %e, "fetch failed, excluding candidate");
                return CandidateOutcome::Skipped(SkippedCandidate {
                    url,
                    reason: e.to_string(),
                });
            }
        };

        match mode {
            RunMode::Classify => {
                match self.classifier.classify(&document.text, topic).await {
                    Ok(Classification::NotRelevant) => {
                        CandidateOutcome::Analyzed(AnalysisResult::NotRelevant { url })
                    }
                    Ok(Classification::Relevant { title, summary }) => {
                        CandidateOutcome::Analyzed(AnalysisResult::Relevant {
                            url,
                            title,
                            summary,
                        })
                    }
                    Err(e @ LlmError::TermNotFound { .. }) => {
                        CandidateOutcome::Skipped(SkippedCandidate {
                            url,
                            reason: e.to_string(),
                        })
                    }
                    Err(e) => CandidateOutcome::Analyzed(AnalysisResult::Error {
                        url,
                        message: e.to_string(),
                    }),
                }
            }
            RunMode::Extract => {
                let source = hit.url.host_str().unwrap_or("unknown source").to_string();
                match self
                    .classifier
                    .generate_extraction(&document.text, &source, document.is_pdf)
                    .await
                {
                    Ok(artifact) => CandidateOutcome::Analyzed(AnalysisResult::Extraction {
                        url,
                        sample: artifact.sample,
                        script: artifact.script,
                    }),
                    Err(e) => CandidateOutcome::Analyzed(AnalysisResult::Error {
                        url,
                        message: e.to_string(),
                    }),
                }
            }
        }
    }
}
