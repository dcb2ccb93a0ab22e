//! Results handed back to the caller.

use serde::{Deserialize, Serialize};

/// Verdict on one candidate source after fetch + model triage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// The model looked and found nothing about the topic.
    NotRelevant { url: String },

    /// The model found a relevant abstract or talk.
    Relevant {
        url: String,
        title: String,
        summary: String,
    },

    /// Structured extraction mode: sample record plus a generated parser.
    Extraction {
        url: String,
        sample: SampleRecord,
        script: String,
    },

    /// The candidate was processed but the model call ultimately failed.
    Error { url: String, message: String },
}

impl AnalysisResult {
    /// URL of the candidate this result describes.
    pub fn url(&self) -> &str {
        match self {
            Self::NotRelevant { url }
            | Self::Relevant { url, .. }
            | Self::Extraction { url, .. }
            | Self::Error { url, .. } => url,
        }
    }
}

/// One parsed abstract, returned by structured extraction mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub title: String,
    pub authors: String,
    pub body: String,
}

/// Output of structured extraction mode: a sample record and the
/// parsing script the model generated for documents of this shape.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionArtifact {
    pub sample: SampleRecord,
    pub script: String,
}

/// A candidate dropped before or instead of analysis, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCandidate {
    pub url: String,
    pub reason: String,
}

/// Everything one research run produced.
///
/// `results` holds the per-candidate analysis outcomes; `skipped` records
/// every candidate excluded by filtering or fetch failures so callers can
/// show why. Expected failure modes (no sources, all blocked, nothing
/// relevant) yield an empty or partial report, never an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResearchReport {
    /// Analysis outcomes, in search order for sequential runs and in
    /// completion order for concurrent runs.
    pub results: Vec<AnalysisResult>,

    /// Candidates excluded before a model verdict, with reasons.
    pub skipped: Vec<SkippedCandidate>,

    /// How many search queries were planned.
    pub queries_planned: usize,

    /// How many deduplicated hits survived search-stage filtering.
    pub hits_considered: usize,
}

impl ResearchReport {
    /// Number of candidates the model judged relevant.
    pub fn relevant_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, AnalysisResult::Relevant { .. }))
            .count()
    }

    /// True when nothing at all came out of the run.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.skipped.is_empty()
    }
}
