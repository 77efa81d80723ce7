/// Upstream data-source abstractions
///
/// The pipeline consumes two collaborators: a knowledge-base article source
/// (search + fetch + file metadata) and a generative completion source.
/// Both sit behind traits so the extraction and orchestration logic can be
/// exercised against mocks and stubs without the network.
use crate::{
    error::AppResult,
    models::{ArticlePage, SearchHit},
};

#[cfg(test)]
use mockall::automock;

pub mod gemini;
pub mod mediawiki;

pub use gemini::GeminiProvider;
pub use mediawiki::MediaWikiProvider;

/// Free-text article search and content fetch against the knowledge base
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Free-text search; results keep the source-provided order and the
    /// first hit is treated as authoritative by callers.
    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>>;

    /// Fetch an article's canonical title, introductory plain-text extract,
    /// raw markup revision, and best-available lead image.
    async fn fetch_page(&self, page_id: u64) -> AppResult<ArticlePage>;

    /// Fetch only the raw markup revision of an article
    async fn fetch_markup(&self, page_id: u64) -> AppResult<String>;

    /// Resolve an `image =` filename to a concrete URL via the file-metadata
    /// endpoint. `Ok(None)` when the file has no resolvable URL.
    async fn resolve_file_url(&self, filename: &str) -> AppResult<Option<String>>;
}

/// Generative completion endpoint used for the primary recommendation path
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CompletionSource: Send + Sync {
    /// Run one prompt to completion and return the raw response text
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}
