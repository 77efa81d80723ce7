/// MediaWiki action API provider
///
/// Implements the two-step search-then-fetch protocol against a MediaWiki
/// `api.php` endpoint:
/// 1. `list=search` → ordered hits, first result wins
/// 2. `prop=extracts|pageimages|revisions` → summary, markup, lead image
///
/// A third call shape (`prop=imageinfo`) resolves infobox image filenames
/// to URLs when the page carries no canonical original image.
use crate::{
    error::{AppError, AppResult},
    models::{ArticlePage, SearchHit},
    services::providers::ArticleSource,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

#[derive(Clone)]
pub struct MediaWikiProvider {
    http_client: HttpClient,
    api_url: String,
}

impl MediaWikiProvider {
    /// Creates a provider against the given `api.php` endpoint. Every call
    /// carries the same upstream timeout; a timed-out call surfaces as a
    /// failed lookup to the caller.
    pub fn new(api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http_client,
            api_url,
        })
    }

    async fn query(&self, params: &[(&str, &str)]) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("utf8", "1")])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Knowledge base returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl ArticleSource for MediaWikiProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>> {
        let body = self
            .query(&[("list", "search"), ("srsearch", query)])
            .await?;

        let hits = body["query"]["search"].clone();
        let hits: Vec<SearchHit> = serde_json::from_value(hits).map_err(|e| {
            AppError::ExternalApi(format!("Invalid search response format: {}", e))
        })?;

        tracing::debug!(query = %query, results = hits.len(), "Article search completed");

        Ok(hits)
    }

    async fn fetch_page(&self, page_id: u64) -> AppResult<ArticlePage> {
        let page_ids = page_id.to_string();
        let body = self
            .query(&[
                ("prop", "extracts|pageimages|revisions"),
                ("pageids", page_ids.as_str()),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("piprop", "original"),
                ("rvprop", "content"),
            ])
            .await?;

        let page = &body["query"]["pages"][page_ids.as_str()];
        let title = page["title"].as_str().ok_or_else(|| {
            AppError::ExternalApi(format!("Page {} has no title in fetch response", page_id))
        })?;

        Ok(ArticlePage {
            page_id,
            title: title.to_string(),
            extract: page["extract"].as_str().unwrap_or_default().to_string(),
            markup: page["revisions"][0]["*"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            original_image: page["original"]["source"].as_str().map(str::to_string),
        })
    }

    async fn fetch_markup(&self, page_id: u64) -> AppResult<String> {
        let page_ids = page_id.to_string();
        let body = self
            .query(&[
                ("prop", "revisions"),
                ("pageids", page_ids.as_str()),
                ("rvprop", "content"),
                ("rvslots", "main"),
            ])
            .await?;

        body["query"]["pages"][page_ids.as_str()]["revisions"][0]["slots"]["main"]["*"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::ExternalApi(format!("Page {} has no markup revision", page_id))
            })
    }

    async fn resolve_file_url(&self, filename: &str) -> AppResult<Option<String>> {
        let title = format!("File:{}", filename);
        let body = self
            .query(&[("prop", "imageinfo"), ("titles", title.as_str()), ("iiprop", "url")])
            .await?;

        // The pages map is keyed by a page id we don't know ahead of time
        // (and is "-1" for missing files), so take the first entry.
        let url = body["query"]["pages"]
            .as_object()
            .and_then(|pages| pages.values().next())
            .and_then(|page| page["imageinfo"][0]["url"].as_str())
            .map(str::to_string);

        Ok(url)
    }
}
