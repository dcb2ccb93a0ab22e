//! Query planning: turns a topic into a bounded set of search queries.
//!
//! Site-restricted queries over discovered society domains come first so
//! authoritative sources are tried before the open web. Every query carries
//! a fixed anti-noise exclusion clause.

use tracing::{debug, warn};

use crate::prompts::format_hint_domains_prompt;
use crate::traits::llm::ModelChain;

/// Topic words that never contribute to an acronym.
const ACRONYM_STOP_WORDS: &[&str] = &["of", "and", "the", "for", "in", "with"];

/// Domain vocabulary combined with the topic, one query each.
const CONTEXT_TEMPLATES: &[&str] = &[
    "conference abstract",
    "scientific program",
    "annual meeting abstract",
    "poster session pdf",
    "proceedings",
];

/// Appended to every query to push down tech/brand noise.
const EXCLUSION_CLAUSE: &str = "-chatgpt -openai -github -python -code";

/// Most hint domains kept from one discovery call.
const MAX_HINT_DOMAINS: usize = 5;

/// Derive an acronym from a multi-word topic, skipping stop words.
/// "Paroxysmal Nocturnal Hemoglobinuria" becomes "PNH". Single-word
/// topics get none.
pub fn generate_acronym(topic: &str) -> Option<String> {
    let words: Vec<&str> = topic
        .split_whitespace()
        .filter(|w| !ACRONYM_STOP_WORDS.contains(&w.to_ascii_lowercase().as_str()))
        .collect();

    if words.len() < 2 {
        return None;
    }

    Some(
        words
            .iter()
            .filter_map(|w| w.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect(),
    )
}

/// Plan the search queries for a topic. Never returns an empty plan: a
/// blank topic falls back to a single generic query.
pub fn plan_queries(topic: &str, hint_domains: &[String]) -> Vec<String> {
    let topic = topic.trim();
    if topic.is_empty() {
        return vec![format!("medical conference abstract {EXCLUSION_CLAUSE}")];
    }

    let main_term = match generate_acronym(topic) {
        Some(acronym) => format!("(\"{topic}\" OR \"{acronym}\")"),
        None => format!("(\"{topic}\")"),
    };

    let mut queries = Vec::with_capacity(CONTEXT_TEMPLATES.len() + 1);

    // Site-restricted query first: ordering matters, authoritative
    // sources get searched before the unrestricted templates.
    if !hint_domains.is_empty() {
        let sites = hint_domains
            .iter()
            .take(MAX_HINT_DOMAINS)
            .map(|d| format!("site:{d}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        queries.push(format!("{main_term} ({sites}) {EXCLUSION_CLAUSE}"));
    }

    for template in CONTEXT_TEMPLATES {
        queries.push(format!("{main_term} \"{template}\" {EXCLUSION_CLAUSE}"));
    }

    debug!(topic = %topic, count = queries.len(), "planned queries");
    queries
}

/// Ask the model for society/organizer domains to bias the plan.
///
/// Fails open: any transport or parse problem returns an empty set and the
/// pipeline continues with unrestricted queries only.
pub async fn discover_hint_domains(chain: &ModelChain, topic: &str) -> Vec<String> {
    let prompt = format_hint_domains_prompt(topic);

    let response = match chain.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(topic = %topic, error = %e, "hint-domain discovery failed; continuing without hints");
            return Vec::new();
        }
    };

    parse_hint_domains(&response)
}

/// Keep newline-separated tokens that look like bare domains.
fn parse_hint_domains(response: &str) -> Vec<String> {
    response
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .trim_end_matches(['.', ','])
                .to_ascii_lowercase()
        })
        .map(|line| {
            line.strip_prefix("https://")
                .or_else(|| line.strip_prefix("http://"))
                .map(|rest| rest.trim_start_matches("www.").to_string())
                .unwrap_or(line)
        })
        .filter(|token| token.contains('.') && !token.contains(char::is_whitespace))
        .take(MAX_HINT_DOMAINS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acronym_skips_stop_words() {
        assert_eq!(
            generate_acronym("Paroxysmal Nocturnal Hemoglobinuria").as_deref(),
            Some("PNH")
        );
        assert_eq!(
            generate_acronym("Society of the Heart and Lung").as_deref(),
            Some("SHL")
        );
        assert_eq!(generate_acronym("Alzheimer's"), None);
    }

    #[test]
    fn plan_puts_site_restricted_query_first() {
        let hints = vec!["eha.org".to_string(), "asco.org".to_string()];
        let queries = plan_queries("Multiple Sclerosis", &hints);

        assert!(queries[0].contains("site:eha.org OR site:asco.org"));
        assert!(queries.len() > CONTEXT_TEMPLATES.len());
        for q in &queries {
            assert!(q.contains("-chatgpt"), "missing exclusion clause: {q}");
            assert!(q.contains("\"Multiple Sclerosis\""));
            assert!(q.contains("\"MS\""));
        }
    }

    #[test]
    fn plan_without_hints_uses_only_templates() {
        let queries = plan_queries("lupus", &[]);
        assert_eq!(queries.len(), CONTEXT_TEMPLATES.len());
        assert!(queries.iter().all(|q| !q.contains("site:")));
    }

    #[test]
    fn plan_never_empty() {
        let queries = plan_queries("   ", &[]);
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("medical conference abstract"));
    }

    #[test]
    fn hint_parsing_keeps_only_domain_shaped_lines() {
        let response = "Here are some:\n- eha.org\nhttps://www.asco.org\nnot a domain line\nehaweb.org.";
        let domains = parse_hint_domains(response);
        assert_eq!(domains, vec!["eha.org", "asco.org", "ehaweb.org"]);
    }
}
