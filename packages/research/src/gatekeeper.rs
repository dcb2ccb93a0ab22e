//! URL-heuristic gatekeeper: decides whether a candidate looks like a
//! congress/society source before any fetch or model spend.
//!
//! Rules are a single versioned data structure with explicit precedence,
//! evaluated in order: banned host, green flag, red flag, default accept.
//! The verdict is a pure function of the URL string.

use url::Url;

/// Hosts that never yield congress sources: literature databases,
/// consumer health portals, publishers, social platforms, aggregators.
const BANNED_HOSTS: &[&str] = &[
    "pubmed.ncbi.nlm.nih.gov",
    "embase.com",
    "clinicaltrials.gov",
    "cochranelibrary.com",
    "sciencedirect.com",
    "researchgate.net",
    "wiley.com",
    "springer.com",
    "nejm.org",
    "thelancet.com",
    "googleapis.com",
    "google.com",
    "wikipedia.org",
    "youtube.com",
    "github.com",
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
    "reddit.com",
    "webmd.com",
    "mayoclinic.org",
    "healthline.com",
    "clevelandclinic.org",
    "medicalnewstoday.com",
];

/// Path/query tokens that mark a likely scientific document or program page.
const GREEN_FLAGS: &[&str] = &[
    ".pdf",
    "/abstract",
    "/poster",
    "/meeting",
    "/congress",
    "/proceedings",
    "/files/",
    "/downloads/",
];

/// Recent congress years also count as green flags.
const GREEN_YEARS: &[&str] = &["2023", "2024", "2025"];

/// Path tokens that mark consumer/editorial content.
const RED_FLAGS: &[&str] = &[
    "/health-library/",
    "/diseases-conditions/",
    "/symptoms-causes/",
    "/blog/",
    "/news/",
    "/press-release/",
    "/patient-care/",
    "/about-us/",
    "/contact/",
];

/// Title tokens that mark obvious search noise.
const NOISE_TITLE_TOKENS: &[&str] = &["chatgpt", "openai", "github", "code"];

/// Outcome of gating one URL, with the rule that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: String,
}

impl Verdict {
    fn accept(reason: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reason: reason.into(),
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// The allow/deny rule set. One instance is shared by the search-stage
/// block list and the per-candidate gate.
#[derive(Debug, Clone, Default)]
pub struct FilterRules;

impl FilterRules {
    /// Create the default rule set.
    pub fn new() -> Self {
        Self
    }

    /// True if the host matches the banned list.
    pub fn host_banned(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        BANNED_HOSTS.iter().any(|banned| {
            host == *banned || host.ends_with(&format!(".{banned}")) || host.contains(banned)
        })
    }

    /// True if a search-hit title carries an obvious noise token.
    pub fn title_noisy(&self, title: &str) -> bool {
        let title = title.to_ascii_lowercase();
        NOISE_TITLE_TOKENS.iter().any(|t| title.contains(t))
    }

    /// Gate one URL. First matching rule wins.
    pub fn evaluate(&self, url: &str) -> Verdict {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => return Verdict::reject("unparseable URL"),
        };

        let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();

        // 1. Ban check short-circuits before any flag check.
        if self.host_banned(&host) {
            return Verdict::reject(format!("banned domain: {host}"));
        }

        let mut path_query = parsed.path().to_ascii_lowercase();
        if let Some(query) = parsed.query() {
            path_query.push('?');
            path_query.push_str(&query.to_ascii_lowercase());
        }

        // 2. Green flags accept ahead of red flags. doi.org counts both
        // as a host and as a token inside redirect paths/queries.
        if host == "doi.org" || host.ends_with(".doi.org") || path_query.contains("doi.org") {
            return Verdict::accept("green flag: doi.org");
        }
        for flag in GREEN_FLAGS {
            if path_query.contains(flag) {
                return Verdict::accept(format!("green flag: {flag}"));
            }
        }
        for year in GREEN_YEARS {
            if path_query.contains(year) {
                return Verdict::accept(format!("green flag: year {year}"));
            }
        }

        // 3. Red flags reject.
        for flag in RED_FLAGS {
            if path_query.contains(flag) {
                return Verdict::reject(format!("red flag: {flag}"));
            }
        }

        // 4. Ambiguous URLs pass through to content-based filtering.
        Verdict::accept("no matching rule, default accept")
    }

    /// Convenience view of [`evaluate`](Self::evaluate).
    pub fn is_likely_scientific(&self, url: &str) -> bool {
        self.evaluate(url).accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_is_idempotent() {
        let rules = FilterRules::new();
        let url = "https://congress.example.org/2024/program";
        assert_eq!(rules.evaluate(url), rules.evaluate(url));
    }

    #[test]
    fn ban_check_short_circuits_green_flags() {
        let rules = FilterRules::new();
        // A .pdf path on a banned host still gets rejected.
        let verdict = rules.evaluate("https://www.webmd.com/files/abstract.pdf");
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("banned"));
    }

    #[test]
    fn pdf_on_unbanned_host_is_accepted() {
        let rules = FilterRules::new();
        let verdict = rules.evaluate("https://society.example.org/media/poster-book.pdf");
        assert!(verdict.accepted);
        assert!(verdict.reason.contains(".pdf"));
    }

    #[test]
    fn green_flag_beats_red_flag() {
        let rules = FilterRules::new();
        // /abstract appears before the red-flag check runs.
        let verdict = rules.evaluate("https://example.org/abstract/blog/entry");
        assert!(verdict.accepted);
    }

    #[test]
    fn red_flag_rejects_consumer_paths() {
        let rules = FilterRules::new();
        for path in ["/blog/latest", "/diseases-conditions/ms", "/about-us/team"] {
            let url = format!("https://example.org{path}/");
            assert!(!rules.evaluate(&url).accepted, "should reject {url}");
        }
    }

    #[test]
    fn ambiguous_url_defaults_to_accept() {
        let rules = FilterRules::new();
        assert!(rules.is_likely_scientific("https://example.org/program-overview"));
    }

    #[test]
    fn recent_year_counts_as_green() {
        let rules = FilterRules::new();
        assert!(rules.is_likely_scientific("https://example.org/archive/2024-sessions"));
    }

    #[test]
    fn doi_links_are_green() {
        let rules = FilterRules::new();
        assert!(rules.is_likely_scientific("https://doi.org/10.1000/xyz123"));
        assert!(rules.is_likely_scientific("https://dx.doi.org/10.1000/xyz123"));
        // Redirect URLs that carry a DOI target in the query also count.
        assert!(rules.is_likely_scientific(
            "https://example.org/resolve?target=https://doi.org/10.1000/xyz123"
        ));
    }

    #[test]
    fn unparseable_url_is_rejected() {
        let rules = FilterRules::new();
        assert!(!rules.is_likely_scientific("not a url"));
    }

    #[test]
    fn noise_titles_flagged() {
        let rules = FilterRules::new();
        assert!(rules.title_noisy("Using ChatGPT for fun"));
        assert!(!rules.title_noisy("EHA 2024 poster session"));
    }
}
