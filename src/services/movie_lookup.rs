use crate::{
    error::AppResult,
    models::MovieRecord,
    services::{extract, providers::ArticleSource},
};

/// Article base URL for the `sourceUrl` field of enriched records
const ARTICLE_URL_BASE: &str = "https://en.wikipedia.org/?curid=";

/// Looks up a movie by name and assembles its full metadata record.
///
/// Search queries carry a trailing "film" disambiguator so that e.g.
/// "Jersey" resolves to the movie rather than the garment. The first search
/// hit is authoritative. `Ok(None)` means the knowledge base has no match;
/// transport failures propagate to the caller.
pub async fn find_movie(source: &dyn ArticleSource, name: &str) -> AppResult<Option<MovieRecord>> {
    let hits = source.search(&format!("{} film", name)).await?;
    let Some(first) = hits.first() else {
        tracing::info!(query = %name, "No knowledge-base results for movie");
        return Ok(None);
    };

    let page = source.fetch_page(first.page_id).await?;
    let fields = extract::extract(&page.markup, &page.extract);

    let image_url = resolve_image(source, page.original_image, fields.image_file.as_deref()).await;
    let director = fields.directors.first().cloned().unwrap_or_default();

    Ok(Some(MovieRecord {
        title: extract::strip_film_suffix(&page.title),
        description: fields.description,
        image_url,
        year: fields.year,
        genres: fields.genres,
        director,
        directors: fields.directors,
        actors: fields.actors,
        source_id: page.page_id,
        source_url: format!("{}{}", ARTICLE_URL_BASE, page.page_id),
    }))
}

/// Prefers the canonical original image; otherwise resolves the infobox
/// filename best-effort. A failed file lookup leaves the record without an
/// image rather than failing the whole lookup.
async fn resolve_image(
    source: &dyn ArticleSource,
    original: Option<String>,
    image_file: Option<&str>,
) -> Option<String> {
    if original.is_some() {
        return original;
    }

    let file = image_file?;
    match source.resolve_file_url(file).await {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(file = %file, error = %e, "Image file resolution failed");
            None
        }
    }
}
