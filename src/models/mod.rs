use serde::{Deserialize, Deserializer, Serialize};

/// Fully enriched movie metadata extracted from an encyclopedia article.
///
/// Absence of a movie is represented by "record not found", never by an
/// empty record: `title` is always non-empty when a record exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub title: String,
    /// Plain-text synopsis, at most 300 chars including the `...` marker
    pub description: String,
    pub image_url: Option<String>,
    /// 4-digit release year
    pub year: Option<String>,
    pub genres: Vec<String>,
    /// First entry of `directors`, empty when unknown
    pub director: String,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    /// Opaque article identifier in the upstream knowledge base
    pub source_id: u64,
    pub source_url: String,
}

/// Categorized similar-movie recommendations.
///
/// The case-insensitive set of titles across all three lists, plus the seed
/// movie's title, contains no duplicates; each list holds at most 5 records.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub genre_movies: Vec<MovieRecord>,
    pub director_movies: Vec<MovieRecord>,
    pub actor_movies: Vec<MovieRecord>,
}

impl RecommendationSet {
    pub fn is_empty(&self) -> bool {
        self.genre_movies.is_empty()
            && self.director_movies.is_empty()
            && self.actor_movies.is_empty()
    }
}

/// Pre-enrichment recommendation candidate. The generative source supplies
/// all three fields; the heuristic miners supply only `title`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecommendationStub {
    pub title: String,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RecommendationStub {
    pub fn from_title(title: String) -> Self {
        Self {
            title,
            year: None,
            description: None,
        }
    }
}

/// The three category arrays as produced by the generative source
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StubSet {
    #[serde(default)]
    pub genre_movies: Vec<RecommendationStub>,
    #[serde(default)]
    pub director_movies: Vec<RecommendationStub>,
    #[serde(default)]
    pub actor_movies: Vec<RecommendationStub>,
}

impl StubSet {
    pub fn is_empty(&self) -> bool {
        self.genre_movies.is_empty()
            && self.director_movies.is_empty()
            && self.actor_movies.is_empty()
    }
}

/// Generative sources are loose about types and return years both as
/// `"2016"` and as `2016`; accept either, drop anything else.
fn de_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

// ============================================================================
// Knowledge-base wire types
// ============================================================================

/// Single result from the knowledge-base search endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(rename = "pageid")]
    pub page_id: u64,
    pub title: String,
}

/// Article content fetched by page id: canonical title, introductory
/// plain-text extract, raw markup revision, and the lead image when the
/// source provides one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlePage {
    pub page_id: u64,
    pub title: String,
    pub extract: String,
    pub markup: String,
    pub original_image: Option<String>,
}
