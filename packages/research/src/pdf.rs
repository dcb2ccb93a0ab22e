//! PDF text extraction with query-driven page retention.
//!
//! Parses the byte stream with `lopdf` and keeps a bounded set of pages:
//! the first few always (structural context), later pages only when they
//! mention the query term. Parse failures yield an empty string — callers
//! treat that as "no usable content", never as fatal.

use lopdf::Document;
use tracing::{debug, warn};

use crate::classify::term_matches;
use crate::types::config::PdfOptions;

/// Page-capped PDF text extractor.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    options: PdfOptions,
}

impl PdfExtractor {
    /// Create an extractor with the given retention policy.
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }

    /// Extract text from PDF bytes.
    ///
    /// Pages are scanned in document order. The first `keep_first` pages
    /// are always retained; later pages only if they contain `query_term`
    /// (case-insensitive; the first word of a multi-word term also
    /// counts). Scanning stops once `page_cap` pages are retained.
    pub fn extract(&self, bytes: &[u8], query_term: &str) -> String {
        let document = match Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "PDF parse failed, treating as empty");
                return String::new();
            }
        };

        let mut retained: Vec<String> = Vec::new();

        for (index, (page_no, _)) in document.get_pages().into_iter().enumerate() {
            if retained.len() >= self.options.page_cap {
                break;
            }

            let text = match document.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(e) => {
                    debug!(page = page_no, error = %e, "page text extraction failed");
                    continue;
                }
            };

            if index < self.options.keep_first || term_matches(&text, query_term) {
                retained.push(text);
            }
        }

        debug!(pages = retained.len(), "retained PDF pages");
        retained.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pdf_with_pages;
    use crate::types::config::PdfOptions;

    #[test]
    fn keeps_leading_pages_and_term_matches_only() {
        // 20 pages; only page index 10 mentions the term.
        let pages: Vec<String> = (0..20)
            .map(|i| {
                if i == 10 {
                    format!("marker{i} results in Multiple Sclerosis cohorts")
                } else {
                    format!("marker{i} unrelated filler text")
                }
            })
            .collect();
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        let bytes = pdf_with_pages(&page_refs);

        let extractor = PdfExtractor::new(PdfOptions::default().with_keep_first(4));
        let text = extractor.extract(&bytes, "Multiple Sclerosis");

        for kept in [0, 1, 2, 3, 10] {
            assert!(text.contains(&format!("marker{kept}")), "page {kept} missing");
        }
        for dropped in [4, 5, 9, 11, 19] {
            assert!(
                !text.contains(&format!("marker{dropped} ")),
                "page {dropped} should not be retained"
            );
        }

        // Retained pages appear in original order.
        let pos10 = text.find("marker10").unwrap();
        let pos3 = text.find("marker3 ").unwrap();
        assert!(pos3 < pos10);
    }

    #[test]
    fn stops_once_page_cap_reached() {
        // Every page matches; a cap of 5 must stop the scan early.
        let pages: Vec<String> = (0..12)
            .map(|i| format!("marker{i} lupus nephritis data"))
            .collect();
        let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        let bytes = pdf_with_pages(&page_refs);

        let extractor = PdfExtractor::new(PdfOptions::default().with_page_cap(5));
        let text = extractor.extract(&bytes, "lupus");

        let kept = (0..12)
            .filter(|i| text.contains(&format!("marker{i} ")))
            .count();
        assert_eq!(kept, 5);
    }

    #[test]
    fn loose_match_uses_first_word_of_term() {
        let pages = ["front matter page", "later page about multiple topics"];
        let bytes = pdf_with_pages(&pages);

        let extractor = PdfExtractor::new(PdfOptions::default().with_keep_first(1));
        let text = extractor.extract(&bytes, "Multiple Sclerosis");

        assert!(text.contains("multiple topics"));
    }

    #[test]
    fn garbage_bytes_yield_empty_string() {
        let extractor = PdfExtractor::default();
        assert_eq!(extractor.extract(b"not a pdf at all", "term"), "");
    }
}
