//! Web search: the provider client and the multi-language fan-out.

mod lang;
pub mod multilang;
pub mod serpapi;

use std::future::Future;

use serde::Serialize;

pub use lang::{Detected, SearchLang, detect, is_english};
pub use multilang::multi_lang_search;
pub use serpapi::SerpApiClient;

/// One organic hit, tagged with the language it was searched in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
    pub language: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub lang: SearchLang,
    pub country: &'a str,
    pub num: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("SERPAPI_API_KEY not set")]
    ApiKeyNotSet,

    #[error("search API rate limit exceeded")]
    RateLimited,

    #[error("search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("search request failed: {0}")]
    Network(#[from] reqwest::Error),
}

pub trait WebSearch {
    fn search(
        &self,
        request: &SearchRequest<'_>,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;
}
