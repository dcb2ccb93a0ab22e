//! Conference-Abstract Research Library
//!
//! A query-driven pipeline that finds and triages medical congress
//! material on the open web: plan search queries for a disease topic,
//! collect candidate URLs, filter out consumer-health noise, pull text
//! out of HTML pages and PDF abstract books, and ask a language model
//! whether each document actually contains a relevant conference
//! abstract.
//!
//! # Design Philosophy
//!
//! - Search wide, filter hard: over-fetch raw results, then apply a
//!   block list and URL heuristics before spending a single fetch.
//! - Failures are per candidate. A dead link, a paywalled page, or a
//!   model error excludes one source and never aborts the run.
//! - Cheap checks before expensive ones: the query term must appear in
//!   the extracted text before the model is ever asked about it.
//! - Collaborators are injected behind traits so the full pipeline runs
//!   in tests without network access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use congress_research::{
//!     ContentFetcher, LlmConfig, OpenAiCompatClient, Orchestrator,
//!     ResearchConfig, SearxSearcher, TimeRange,
//! };
//!
//! let llm_config = LlmConfig::from_env()?;
//! let config = ResearchConfig::default();
//!
//! let orchestrator = Orchestrator::new(
//!     config.clone(),
//!     SearxSearcher::new("https://searxng.site"),
//!     ContentFetcher::new(config.fetch.clone(), config.pdf.clone())?,
//!     Arc::new(OpenAiCompatClient::new(&llm_config)?),
//!     llm_config.models.clone(),
//! );
//!
//! let report = orchestrator
//!     .run_research("Paroxysmal Nocturnal Hemoglobinuria", 5, TimeRange::Year)
//!     .await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (WebSearcher, LanguageModel, Fetcher)
//! - [`types`] - Domain data types and configuration
//! - [`planner`] - Topic to search-query expansion
//! - [`gatekeeper`] - URL filtering rules
//! - [`search`] - Query execution, dedup, and block-list enforcement
//! - [`fetch`] - HTML/PDF download and text extraction
//! - [`pdf`] - Query-driven PDF page retention
//! - [`classify`] - Model-side triage and structured extraction
//! - [`pipeline`] - The orchestrator tying it all together
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod error;
pub mod fetch;
pub mod gatekeeper;
pub mod pdf;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod search;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, LlmError, SearchError};
pub use security::SecretString;
pub use traits::{
    fetcher::Fetcher,
    llm::{LanguageModel, ModelChain, OpenAiCompatClient},
    searcher::{SearchRequest, SearxSearcher, TimeRange, WebSearcher},
};
pub use types::{
    analysis::{
        AnalysisResult, ExtractionArtifact, ResearchReport, SampleRecord, SkippedCandidate,
    },
    config::{FetchConfig, LlmConfig, PdfOptions, ResearchConfig},
    source::{ExtractedDocument, SearchHit},
};

// Re-export pipeline components
pub use classify::{term_matches, Classification, Classifier};
pub use fetch::ContentFetcher;
pub use gatekeeper::{FilterRules, Verdict};
pub use pdf::PdfExtractor;
pub use pipeline::Orchestrator;
pub use planner::{discover_hint_domains, generate_acronym, plan_queries};
pub use search::{SearchBatch, SearchClient};

// Re-export testing utilities
pub use testing::{MockFetcher, MockLlm, MockSearcher};
