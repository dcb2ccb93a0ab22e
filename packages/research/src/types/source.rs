//! Candidate sources and the documents extracted from them.

use url::Url;

/// One hit from the web-search backend.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The discovered URL.
    pub url: Url,

    /// Title of the page as reported by the search backend.
    pub title: String,

    /// Snippet/description from search results, if the backend provides one.
    pub snippet: Option<String>,
}

impl SearchHit {
    /// Create a new hit.
    pub fn new(url: Url, title: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            snippet: None,
        }
    }

    /// Create from a URL string; returns `None` if it does not parse.
    pub fn from_url(url: &str, title: impl Into<String>) -> Option<Self> {
        Url::parse(url).ok().map(|u| Self::new(u, title))
    }

    /// Attach a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Plain text pulled out of a candidate page or PDF.
///
/// The text is bounded by the fetcher; the classifier may truncate further
/// before the model call. Never empty — empty extractions are rejected
/// upstream as `FetchError::NoContent`.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Where the text came from.
    pub url: Url,

    /// Whether the text came from a PDF (directly or via an on-page link).
    pub is_pdf: bool,

    /// The extracted text.
    pub text: String,

    /// True if the fetcher cut the text to its size bound.
    pub truncated: bool,
}

impl ExtractedDocument {
    /// Build a document, applying the fetcher's size bound of `max_chars`
    /// characters (not bytes).
    pub fn bounded(url: Url, is_pdf: bool, mut text: String, max_chars: usize) -> Self {
        let truncated = match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                text.truncate(cut);
                true
            }
            None => false,
        };
        Self {
            url,
            is_pdf,
            text,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_counts_characters_not_bytes() {
        let url = Url::parse("https://example.org/a").unwrap();
        // Multi-byte chars count once each; the bound is in characters.
        let text = format!("{}é tail", "x".repeat(9));
        let doc = ExtractedDocument::bounded(url, false, text, 10);
        assert!(doc.truncated);
        assert_eq!(doc.text, format!("{}é", "x".repeat(9)));
        assert_eq!(doc.text.chars().count(), 10);
    }

    #[test]
    fn bounded_keeps_short_text_intact() {
        let url = Url::parse("https://example.org/a").unwrap();
        let doc = ExtractedDocument::bounded(url, true, "short".into(), 100);
        assert!(!doc.truncated);
        assert_eq!(doc.text, "short");
    }
}
