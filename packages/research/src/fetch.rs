//! Content fetching: probe, download, and extract plain text from a
//! candidate URL, with PDF-link hunting for thin HTML pages.

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ConfigError, FetchError, FetchResult};
use crate::pdf::PdfExtractor;
use crate::traits::fetcher::Fetcher;
use crate::types::config::{FetchConfig, PdfOptions};
use crate::types::source::ExtractedDocument;

/// HTTP fetcher with HTML text extraction and PDF delegation.
pub struct ContentFetcher {
    client: reqwest::Client,
    config: FetchConfig,
    pdf: PdfExtractor,
}

impl ContentFetcher {
    /// Build a fetcher. Fails fast if the HTTP client cannot be built.
    pub fn new(config: FetchConfig, pdf_options: PdfOptions) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient(Box::new(e)))?;

        Ok(Self {
            client,
            config,
            pdf: PdfExtractor::new(pdf_options),
        })
    }

    /// Header-only probe for the content type. Any failure means
    /// "unknown, assume HTML" rather than an error.
    async fn probe_content_type(&self, url: &Url) -> Option<String> {
        let response = self
            .client
            .head(url.clone())
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .ok()?;

        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase())
    }

    /// Download a PDF and extract its text. Any failure yields an empty
    /// string; the caller decides what "no usable content" means.
    async fn fetch_pdf_text(&self, url: &Url, query_term: &str) -> String {
        let response = match self
            .client
            .get(url.clone())
            .timeout(self.config.page_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %url, error = %e, "PDF download failed");
                return String::new();
            }
        };

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "PDF download rejected");
            return String::new();
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(url = %url, error = %e, "PDF body read failed");
                return String::new();
            }
        };

        self.pdf.extract(&bytes, query_term)
    }

    /// Download an HTML page, mapping statuses onto the fetch taxonomy.
    async fn fetch_page(&self, url: &Url) -> FetchResult<String> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.config.page_timeout)
            .send()
            .await
            .map_err(|_| FetchError::ConnectionFailed {
                url: url.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(FetchError::AccessDenied {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::ConnectionFailed {
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|_| FetchError::ConnectionFailed {
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Fetcher for ContentFetcher {
    async fn fetch(&self, url: &Url, query_term: &str) -> FetchResult<ExtractedDocument> {
        let content_type = self.probe_content_type(url).await;

        if looks_like_pdf(content_type.as_deref(), url) {
            let text = self.fetch_pdf_text(url, query_term).await;
            if text.trim().is_empty() {
                return Err(FetchError::NoContent {
                    url: url.to_string(),
                });
            }
            return Ok(ExtractedDocument::bounded(
                url.clone(),
                true,
                text,
                self.config.max_text_chars,
            ));
        }

        let html = self.fetch_page(url).await?;
        let mut text = html_to_text(&html);
        let mut used_pdf = false;

        // Thin pages often link the actual abstract book as a PDF.
        if text.chars().count() < self.config.min_html_chars {
            if let Some(pdf_url) = find_pdf_link(url, &html) {
                debug!(page = %url, pdf = %pdf_url, "hunting on-page PDF link");
                let pdf_text = self.fetch_pdf_text(&pdf_url, query_term).await;
                if !pdf_text.trim().is_empty() {
                    text.push_str("\n\n");
                    text.push_str(&pdf_text);
                    used_pdf = true;
                }
            }
        }

        if text.trim().is_empty() {
            return Err(FetchError::NoContent {
                url: url.to_string(),
            });
        }

        Ok(ExtractedDocument::bounded(
            url.clone(),
            used_pdf,
            text,
            self.config.max_text_chars,
        ))
    }
}

fn looks_like_pdf(content_type: Option<&str>, url: &Url) -> bool {
    if let Some(ct) = content_type {
        if ct.contains("application/pdf") {
            return true;
        }
    }
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

/// Strip boilerplate and tags, keeping readable body text.
fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();

    // Drop whole boilerplate containers before stripping tags.
    for container in ["script", "style", "noscript", "nav", "header", "footer", "aside"] {
        let pattern = Regex::new(&format!(r"(?is)<{container}[^>]*>.*?</{container}>")).unwrap();
        text = pattern.replace_all(&text, " ").to_string();
    }

    // Block-level boundaries become line breaks so sentences stay apart.
    let block_pattern = Regex::new(r"(?i)</?(p|div|h[1-6]|li|tr|br|section|article)[^>]*>").unwrap();
    text = block_pattern.replace_all(&text, "\n").to_string();

    let tag_pattern = Regex::new(r"<[^>]+>").unwrap();
    text = tag_pattern.replace_all(&text, " ").to_string();

    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    // Collapse runs of whitespace but keep paragraph breaks.
    let spaces = Regex::new(r"[ \t]+").unwrap();
    text = spaces.replace_all(&text, " ").to_string();
    let newlines = Regex::new(r"\n\s*\n\s*(\n\s*)+").unwrap();
    text = newlines.replace_all(&text, "\n\n").to_string();

    text.trim().to_string()
}

/// First anchor whose target ends in `.pdf`, resolved against the page URL.
/// `Url::join` handles absolute, root-relative, and path-relative forms.
fn find_pdf_link(base: &Url, html: &str) -> Option<Url> {
    let href_pattern = Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap();

    for cap in href_pattern.captures_iter(html) {
        let href = cap.get(1)?.as_str();
        if !href.to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }
        if let Ok(resolved) = base.join(href) {
            return Some(resolved);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_detection_by_header_and_extension() {
        let pdf_url = Url::parse("https://example.org/abstracts.PDF").unwrap();
        let html_url = Url::parse("https://example.org/program").unwrap();

        assert!(looks_like_pdf(Some("application/pdf"), &html_url));
        assert!(looks_like_pdf(None, &pdf_url));
        assert!(!looks_like_pdf(Some("text/html; charset=utf-8"), &html_url));
    }

    #[test]
    fn html_text_drops_boilerplate() {
        let html = r#"
            <html><head><style>.x{color:red}</style></head>
            <body>
              <nav><a href="/">Home</a><a href="/about">About</a></nav>
              <h1>Poster session</h1>
              <p>Outcomes in 120 patients were reported.</p>
              <script>trackPageView();</script>
              <footer>Copyright</footer>
            </body></html>
        "#;

        let text = html_to_text(html);
        assert!(text.contains("Poster session"));
        assert!(text.contains("Outcomes in 120 patients"));
        assert!(!text.contains("trackPageView"));
        assert!(!text.contains("color:red"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn pdf_link_resolution_handles_relative_forms() {
        let base = Url::parse("https://example.org/2024/program/index.html").unwrap();

        let root_relative = r#"<a href="/files/abstracts.pdf">book</a>"#;
        assert_eq!(
            find_pdf_link(&base, root_relative).unwrap().as_str(),
            "https://example.org/files/abstracts.pdf"
        );

        let path_relative = r#"<a href="posters.pdf">posters</a>"#;
        assert_eq!(
            find_pdf_link(&base, path_relative).unwrap().as_str(),
            "https://example.org/2024/program/posters.pdf"
        );

        let absolute = r#"<a href="https://cdn.example.org/a.pdf">cdn</a>"#;
        assert_eq!(
            find_pdf_link(&base, absolute).unwrap().as_str(),
            "https://cdn.example.org/a.pdf"
        );

        let none = r#"<a href="/about">about</a>"#;
        assert!(find_pdf_link(&base, none).is_none());
    }

    #[test]
    fn first_pdf_link_wins() {
        let base = Url::parse("https://example.org/").unwrap();
        let html = r#"<a href="/one.pdf">1</a><a href="/two.pdf">2</a>"#;
        assert_eq!(
            find_pdf_link(&base, html).unwrap().as_str(),
            "https://example.org/one.pdf"
        );
    }
}
