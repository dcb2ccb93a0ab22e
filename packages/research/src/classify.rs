//! Model-side triage of extracted documents.
//!
//! Free-text mode answers "Not relevant" or a titled summary; structured
//! extraction mode returns a sample record plus a generated parsing
//! script. Both run through the [`ModelChain`] fallback.

use serde::Deserialize;
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::prompts::{format_classify_prompt, format_extraction_prompt};
use crate::traits::llm::ModelChain;
use crate::types::analysis::{ExtractionArtifact, SampleRecord};

/// Free-text verdict for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    NotRelevant,
    Relevant { title: String, summary: String },
}

/// True when `term` (or, for multi-word terms, its first word) appears in
/// `text`, case-insensitively. Shared by the classifier pre-check and the
/// PDF page-retention heuristic.
pub fn term_matches(text: &str, term: &str) -> bool {
    let text = text.to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    if text.contains(&term) {
        return true;
    }
    match term.split_whitespace().next() {
        Some(first) if first != term => text.contains(first),
        _ => false,
    }
}

/// Classifier wrapping the model chain with a text budget.
#[derive(Clone)]
pub struct Classifier {
    chain: ModelChain,
    max_chars: usize,
}

impl Classifier {
    /// Create a classifier. `max_chars` bounds the document text included
    /// in any prompt.
    pub fn new(chain: ModelChain, max_chars: usize) -> Self {
        Self { chain, max_chars }
    }

    /// The underlying chain, for auxiliary one-shot calls.
    pub fn chain(&self) -> &ModelChain {
        &self.chain
    }

    /// Free-text mode.
    ///
    /// Documents that never mention the query term short-circuit with
    /// [`LlmError::TermNotFound`] before any model call is made.
    pub async fn classify(&self, text: &str, query_term: &str) -> LlmResult<Classification> {
        if !term_matches(text, query_term) {
            debug!(term = %query_term, "term pre-check failed, skipping model call");
            return Err(LlmError::TermNotFound {
                term: query_term.to_string(),
            });
        }

        let input = truncate_to_budget(text, self.max_chars);
        let prompt = format_classify_prompt(input, query_term);
        let raw = self.chain.complete(&prompt).await?;

        Ok(parse_classification(&raw))
    }

    /// Structured extraction mode.
    pub async fn generate_extraction(
        &self,
        text: &str,
        source: &str,
        is_pdf: bool,
    ) -> LlmResult<ExtractionArtifact> {
        let input = truncate_to_budget(text, self.max_chars);
        let prompt = format_extraction_prompt(input, source, is_pdf);
        let raw = self.chain.complete_json(&prompt).await?;

        let response: ExtractionResponse = serde_json::from_str(strip_code_fence(&raw))?;
        Ok(ExtractionArtifact {
            sample: response.sample_abstract,
            script: response.parsing_script,
        })
    }
}

#[derive(Deserialize)]
struct ExtractionResponse {
    sample_abstract: SampleRecord,
    #[serde(alias = "python_parsing_script", alias = "generated_script")]
    parsing_script: String,
}

/// Cut `text` to at most `max_chars` characters.
fn truncate_to_budget(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Models wrap JSON in markdown fences often enough to strip them here.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim().strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_classification(raw: &str) -> Classification {
    let trimmed = raw.trim();

    let first_line = trimmed
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    if first_line
        .trim_matches(|c: char| c == '*' || c == '"' || c == '.')
        .eq_ignore_ascii_case("not relevant")
    {
        return Classification::NotRelevant;
    }

    let mut title: Option<String> = None;
    let mut summary_lines: Vec<&str> = Vec::new();

    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("**Title:**") {
            title = Some(rest.trim().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("**Summary:**") {
            let rest = rest.trim();
            if !rest.is_empty() {
                summary_lines.push(rest);
            }
            continue;
        }
        summary_lines.push(line);
    }

    match title {
        Some(title) => Classification::Relevant {
            title,
            summary: summary_lines.join("\n"),
        },
        // No title marker: keep the whole answer as the summary so the
        // caller still sees what the model said.
        None => Classification::Relevant {
            title: first_line.to_string(),
            summary: trimmed
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && *l != first_line)
                .collect::<Vec<_>>()
                .join("\n"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlm;
    use std::sync::Arc;

    fn classifier_with(mock: Arc<MockLlm>, models: &[&str]) -> Classifier {
        let chain = ModelChain::new(mock, models.iter().map(|m| m.to_string()).collect());
        Classifier::new(chain, 30_000)
    }

    #[test]
    fn term_matching_is_case_insensitive_and_loose() {
        assert!(term_matches("studies of MULTIPLE sclerosis", "Multiple Sclerosis"));
        assert!(term_matches("multiple cohorts enrolled", "Multiple Sclerosis"));
        assert!(!term_matches("unrelated document", "PNH"));
        assert!(term_matches("pnh registry data", "PNH"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // 8 chars but 16 bytes; the budget is in characters.
        let text = "é".repeat(8);
        assert_eq!(truncate_to_budget(&text, 5), "é".repeat(5));
        assert_eq!(truncate_to_budget(&text, 8), text);
        assert_eq!(truncate_to_budget(&text, 20), text);
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn not_relevant_answers_parse() {
        assert_eq!(parse_classification("Not relevant"), Classification::NotRelevant);
        assert_eq!(
            parse_classification("  \"not relevant\".  "),
            Classification::NotRelevant
        );
    }

    #[test]
    fn titled_summaries_parse() {
        let raw = "**Title:** CAR-T outcomes in r/r DLBCL\n**Summary:**\n- point one\n- point two\n- point three";
        match parse_classification(raw) {
            Classification::Relevant { title, summary } => {
                assert_eq!(title, "CAR-T outcomes in r/r DLBCL");
                assert_eq!(summary.lines().count(), 3);
            }
            other => panic!("expected relevant, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn precheck_failure_makes_no_model_call() {
        let mock = Arc::new(MockLlm::new());
        let classifier = classifier_with(mock.clone(), &["primary"]);

        let outcome = classifier
            .classify("a document about something else entirely", "PNH")
            .await;

        assert!(matches!(outcome, Err(LlmError::TermNotFound { .. })));
        assert!(mock.calls().is_empty(), "no model call expected");
    }

    #[tokio::test]
    async fn fallback_model_is_tried_once_after_primary_fails() {
        let mock = Arc::new(
            MockLlm::new()
                .failing_model("primary")
                .with_response_containing(
                    "conference abstract related to",
                    "**Title:** PNH burden study\n**Summary:**\n- a\n- b\n- c",
                ),
        );
        let classifier = classifier_with(mock.clone(), &["primary", "fallback"]);

        let outcome = classifier
            .classify("registry data on PNH patients", "PNH")
            .await
            .unwrap();

        assert!(matches!(outcome, Classification::Relevant { .. }));
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].model, "primary");
        assert_eq!(calls[1].model, "fallback");
    }

    #[tokio::test]
    async fn all_models_failing_reports_every_attempt() {
        let mock = Arc::new(MockLlm::new().failing_model("a").failing_model("b"));
        let classifier = classifier_with(mock, &["a", "b"]);

        let err = classifier
            .classify("PNH registry", "PNH")
            .await
            .unwrap_err();

        match err {
            LlmError::AllModelsFailed { attempts } => assert_eq!(attempts.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn structured_mode_parses_json_response() {
        let json = r#"{
            "sample_abstract": {"title": "T", "authors": "A, B", "body": "Body text"},
            "parsing_script": "import csv"
        }"#;
        let mock = Arc::new(MockLlm::new().with_response_containing("data engineer", json));
        let classifier = classifier_with(mock, &["primary"]);

        let artifact = classifier
            .generate_extraction("some congress text", "ehaweb.org", true)
            .await
            .unwrap();

        assert_eq!(artifact.sample.title, "T");
        assert_eq!(artifact.script, "import csv");
    }
}
