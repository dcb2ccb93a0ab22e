//! Test doubles and fixtures.
//!
//! Hand-rolled mocks with call tracking, so tests can assert not just on
//! outputs but on which calls the pipeline actually made (or avoided).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use url::Url;

use crate::error::{FetchError, FetchResult, LlmError, LlmResult, SearchError, SearchResult};
use crate::traits::fetcher::Fetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::searcher::{SearchRequest, WebSearcher};
use crate::types::source::{ExtractedDocument, SearchHit};

/// Scripted search backend.
///
/// Queries listed via [`failing_on`](Self::failing_on) error; queries with
/// dedicated hits return those; everything else returns the default hits.
#[derive(Default)]
pub struct MockSearcher {
    default_hits: Vec<SearchHit>,
    per_query: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits returned for any query without a dedicated script.
    pub fn with_default_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.default_hits = hits;
        self
    }

    /// Hits returned for one exact query string.
    pub fn with_hits(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.per_query.insert(query.to_string(), hits);
        self
    }

    /// Make one exact query string fail.
    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Every query string this mock has seen, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, request: &SearchRequest) -> SearchResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(request.query.clone());

        if self.failing.contains(&request.query) {
            return Err(SearchError::BadStatus { status: 503 });
        }

        let hits = self
            .per_query
            .get(&request.query)
            .unwrap_or(&self.default_hits);
        Ok(hits.iter().take(request.max_results).cloned().collect())
    }
}

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct LlmCall {
    pub model: String,
    pub prompt: String,
}

/// Scripted language model.
///
/// Responses are matched by prompt substring, first match wins; prompts
/// matching nothing get `"Not relevant"`. Models registered via
/// [`failing_model`](Self::failing_model) always error.
#[derive(Default)]
pub struct MockLlm {
    responses: Vec<(String, String)>,
    failing_models: HashSet<String>,
    calls: Mutex<Vec<LlmCall>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to any prompt containing `fragment`.
    pub fn with_response_containing(mut self, fragment: &str, response: &str) -> Self {
        self.responses
            .push((fragment.to_string(), response.to_string()));
        self
    }

    /// Make every call naming this model id fail.
    pub fn failing_model(mut self, model: &str) -> Self {
        self.failing_models.insert(model.to_string());
        self
    }

    /// Every call this mock has seen, in call order.
    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, model: &str, prompt: &str) -> LlmResult<String> {
        self.calls.lock().unwrap().push(LlmCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        if self.failing_models.contains(model) {
            return Err(LlmError::BadStatus {
                status: 500,
                body: format!("scripted failure for {model}"),
            });
        }

        let response = self
            .responses
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| "Not relevant".to_string());
        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn complete(&self, model: &str, prompt: &str) -> LlmResult<String> {
        self.answer(model, prompt)
    }

    async fn complete_json(&self, model: &str, prompt: &str) -> LlmResult<String> {
        self.answer(model, prompt)
    }
}

/// Scripted fetcher. URLs without a scripted document fail with
/// `ConnectionFailed`. Clones share the fetch log.
#[derive(Clone, Default)]
pub struct MockFetcher {
    documents: HashMap<String, (String, bool)>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the text returned for one exact URL.
    pub fn with_document(mut self, url: &str, text: &str, is_pdf: bool) -> Self {
        self.documents
            .insert(url.to_string(), (text.to_string(), is_pdf));
        self
    }

    /// Every URL this mock has fetched, in call order.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &Url, _query_term: &str) -> FetchResult<ExtractedDocument> {
        self.fetched.lock().unwrap().push(url.to_string());

        match self.documents.get(url.as_str()) {
            Some((text, is_pdf)) => Ok(ExtractedDocument {
                url: url.clone(),
                is_pdf: *is_pdf,
                text: text.clone(),
                truncated: false,
            }),
            None => Err(FetchError::ConnectionFailed {
                url: url.to_string(),
            }),
        }
    }
}

/// Build a minimal in-memory PDF with one line of text per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
