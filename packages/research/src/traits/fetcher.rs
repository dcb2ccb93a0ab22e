//! Fetcher trait: URL in, extracted document out.

use async_trait::async_trait;
use url::Url;

use crate::error::FetchResult;
use crate::types::source::ExtractedDocument;

/// Turns a candidate URL into bounded plain text.
///
/// The live implementation is [`crate::fetch::ContentFetcher`]; tests use
/// [`crate::testing::MockFetcher`]. Implementations must guarantee that a
/// returned document has non-empty text — empty extractions come back as
/// `FetchError::NoContent`, so the model is never asked about nothing.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch and extract one candidate. `query_term` drives PDF page
    /// retention.
    async fn fetch(&self, url: &Url, query_term: &str) -> FetchResult<ExtractedDocument>;
}
