//! Trait seams for the external collaborators: search backend,
//! model endpoint, and content fetching. Each has a live implementation
//! and a mock in [`crate::testing`].

pub mod fetcher;
pub mod llm;
pub mod searcher;
