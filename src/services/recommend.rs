/// Recommendation orchestrator: generative source first, heuristic mining
/// as the fallback, and knowledge-base enrichment for whichever path wins.
///
/// The orchestration never fails past the generative attempt: miner and
/// enrichment errors are absorbed per candidate, and the caller always
/// receives a well-formed (possibly sparse) set.
use std::collections::HashSet;
use std::sync::Arc;

use rand::{rngs::SmallRng, SeedableRng};
use tokio::sync::Semaphore;

use crate::{
    error::{AppError, AppResult},
    models::{MovieRecord, RecommendationSet, RecommendationStub, StubSet},
    services::{
        filmography::{self, Role},
        genre_list, movie_lookup,
        providers::{ArticleSource, CompletionSource},
    },
};

/// Enriched records per category
const CATEGORY_CAP: usize = 5;
/// Candidates fetched per category before the cap is applied
const ENRICH_FETCH_CAP: usize = 10;
/// Actors whose filmographies are mined on the fallback path
const ACTOR_MINE_LIMIT: usize = 2;
/// Actors named in the generative prompt
const PROMPT_ACTOR_LIMIT: usize = 3;
/// Genre candidates kept pre-enrichment on the fallback path
const GENRE_STUB_CAP: usize = 10;

pub struct Recommender {
    articles: Arc<dyn ArticleSource>,
    completions: Arc<dyn CompletionSource>,
    enrich_concurrency: usize,
}

impl Recommender {
    pub fn new(
        articles: Arc<dyn ArticleSource>,
        completions: Arc<dyn CompletionSource>,
        enrich_concurrency: usize,
    ) -> Self {
        Self {
            articles,
            completions,
            enrich_concurrency: enrich_concurrency.max(1),
        }
    }

    /// Builds the categorized recommendation set for a seed movie.
    ///
    /// Always returns a set; an all-empty one means both the generative and
    /// heuristic paths came up dry.
    pub async fn build_recommendations(
        &self,
        seed_title: &str,
        seed: &MovieRecord,
    ) -> RecommendationSet {
        let stubs = match self.generative_stubs(seed).await {
            Ok(stubs) if !stubs.is_empty() => {
                tracing::info!(
                    genre = stubs.genre_movies.len(),
                    director = stubs.director_movies.len(),
                    actor = stubs.actor_movies.len(),
                    "Generative recommendations received"
                );
                stubs
            }
            Ok(_) => {
                tracing::info!("Generative recommendations empty, mining knowledge base");
                self.heuristic_stubs(seed).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Generative source unavailable, mining knowledge base");
                self.heuristic_stubs(seed).await
            }
        };

        self.enrich(seed_title, seed, stubs).await
    }

    async fn generative_stubs(&self, seed: &MovieRecord) -> AppResult<StubSet> {
        let prompt = build_prompt(seed);
        let text = self.completions.complete(&prompt).await?;
        parse_stub_response(&text).ok_or_else(|| {
            AppError::Generative("response did not contain a recommendation object".to_string())
        })
    }

    /// Fallback path: mine the director's and leading actors' filmographies
    /// and the primary genre's list article. A shared seen-set keeps the
    /// stub categories disjoint and excludes the seed movie itself.
    async fn heuristic_stubs(&self, seed: &MovieRecord) -> StubSet {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(seed.title.to_lowercase());

        let mut stubs = StubSet::default();

        if !seed.director.is_empty() {
            let titles =
                filmography::mine(self.articles.as_ref(), &seed.director, Role::Director).await;
            for title in titles {
                if seen.insert(title.to_lowercase()) {
                    stubs.director_movies.push(RecommendationStub::from_title(title));
                }
            }
        }

        for actor in seed.actors.iter().take(ACTOR_MINE_LIMIT) {
            let titles = filmography::mine(self.articles.as_ref(), actor, Role::Actor).await;
            for title in titles {
                if seen.insert(title.to_lowercase()) {
                    stubs.actor_movies.push(RecommendationStub::from_title(title));
                }
            }
        }

        if let Some(genre) = seed.genres.first() {
            let mut rng = SmallRng::from_entropy();
            let titles = genre_list::mine(self.articles.as_ref(), genre, &mut rng).await;
            for title in titles {
                if seen.insert(title.to_lowercase()) {
                    stubs.genre_movies.push(RecommendationStub::from_title(title));
                    if stubs.genre_movies.len() >= GENRE_STUB_CAP {
                        break;
                    }
                }
            }
        }

        stubs
    }

    /// Turns title stubs into full records. Dedup is global: the seen-set
    /// spans the seed title and every record already placed in any
    /// category, compared case-insensitively.
    async fn enrich(
        &self,
        seed_title: &str,
        seed: &MovieRecord,
        stubs: StubSet,
    ) -> RecommendationSet {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(seed_title.to_lowercase());
        seen.insert(seed.title.to_lowercase());

        let semaphore = Arc::new(Semaphore::new(self.enrich_concurrency));

        let genre_movies = self
            .enrich_category(stubs.genre_movies, &mut seen, &semaphore)
            .await;
        let director_movies = self
            .enrich_category(stubs.director_movies, &mut seen, &semaphore)
            .await;
        let actor_movies = self
            .enrich_category(stubs.actor_movies, &mut seen, &semaphore)
            .await;

        RecommendationSet {
            genre_movies,
            director_movies,
            actor_movies,
        }
    }

    async fn enrich_category(
        &self,
        stubs: Vec<RecommendationStub>,
        seen: &mut HashSet<String>,
        semaphore: &Arc<Semaphore>,
    ) -> Vec<MovieRecord> {
        let mut tasks = Vec::new();

        for stub in stubs.into_iter().take(ENRICH_FETCH_CAP) {
            if seen.contains(&stub.title.to_lowercase()) {
                continue;
            }

            let articles = Arc::clone(&self.articles);
            let semaphore = Arc::clone(semaphore);
            let task = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                match movie_lookup::find_movie(articles.as_ref(), &stub.title).await {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::debug!(
                            title = %stub.title,
                            error = %e,
                            "Candidate enrichment failed"
                        );
                        None
                    }
                }
            });
            tasks.push(task);
        }

        // Join in spawn order so the list follows candidate discovery
        // order, not completion order.
        let mut records: Vec<MovieRecord> = Vec::new();
        for task in tasks {
            let Ok(Some(record)) = task.await else {
                continue;
            };
            if records.len() >= CATEGORY_CAP {
                continue;
            }
            if seen.insert(record.title.to_lowercase()) {
                records.push(record);
            }
        }

        records
    }
}

fn build_prompt(seed: &MovieRecord) -> String {
    let genres = if seed.genres.is_empty() {
        "Unknown".to_string()
    } else {
        seed.genres.join(", ")
    };
    let director = if seed.director.is_empty() {
        "Unknown"
    } else {
        seed.director.as_str()
    };
    let year = seed.year.as_deref().unwrap_or("Unknown");
    let actors = if seed.actors.is_empty() {
        "Unknown".to_string()
    } else {
        seed.actors
            .iter()
            .take(PROMPT_ACTOR_LIMIT)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"I'm looking for movie recommendations similar to the following movie:
Title: {title}
Genre: {genres}
Director: {director}
Year: {year}
Actors: {actors}

Please provide a JSON response with three categories of similar movies:
1. Movies with similar genres and themes
2. Movies by the same director (if available)
3. Movies with the same actors (if available)

Format your response as valid JSON with this structure:
{{
  "genreMovies": [{{"title": "Movie Title", "year": "Year", "description": "Brief description of why this movie is similar"}}],
  "directorMovies": [{{"title": "Movie Title", "year": "Year", "description": "Brief description of why this movie is similar"}}],
  "actorMovies": [{{"title": "Movie Title", "year": "Year", "description": "Brief description of why this movie is similar"}}]
}}

Limit each category to 3-5 movies. Use accurate movie titles and years.
Don't include the original movie in the recommendations."#,
        title = seed.title,
        genres = genres,
        director = director,
        year = year,
        actors = actors,
    )
}

/// Parses the completion text, tolerating prose around the JSON payload
fn parse_stub_response(text: &str) -> Option<StubSet> {
    let span = first_json_object(text)?;
    match serde_json::from_str(span) {
        Ok(stubs) => Some(stubs),
        Err(e) => {
            tracing::debug!(error = %e, "Completion payload was not a stub set");
            None
        }
    }
}

/// First balanced `{...}` span in the text
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticlePage, SearchHit};
    use crate::services::providers::{MockArticleSource, MockCompletionSource};

    const TITLES: &[&str] = &["Jersey", "Chhichhore", "Chak De! India", "Dangal"];

    fn page_id_for(title: &str) -> u64 {
        TITLES
            .iter()
            .position(|t| *t == title)
            .map(|i| i as u64)
            .unwrap_or(99)
    }

    fn page_for(page_id: u64) -> ArticlePage {
        let title = TITLES.get(page_id as usize).copied().unwrap_or("Unknown");
        ArticlePage {
            page_id,
            title: title.to_string(),
            extract: format!("{} is a film.", title),
            markup: String::new(),
            original_image: None,
        }
    }

    fn hit(page_id: u64, title: &str) -> SearchHit {
        SearchHit {
            page_id,
            title: title.to_string(),
        }
    }

    /// Article source that resolves any "X film" query to a page titled X
    fn enrichment_source() -> MockArticleSource {
        let mut source = MockArticleSource::new();
        source.expect_search().returning(|query| {
            let title = query.strip_suffix(" film").unwrap_or(query);
            Ok(vec![hit(page_id_for(title), title)])
        });
        source.expect_fetch_page().returning(|id| Ok(page_for(id)));
        source
    }

    fn seed_record() -> MovieRecord {
        MovieRecord {
            title: "Dangal".to_string(),
            description: "Former wrestler trains his daughters.".to_string(),
            image_url: None,
            year: Some("2016".to_string()),
            genres: vec!["Drama".to_string(), "Sport".to_string()],
            director: "Nitesh Tiwari".to_string(),
            directors: vec!["Nitesh Tiwari".to_string()],
            actors: vec![
                "Aamir Khan".to_string(),
                "Sakshi Tanwar".to_string(),
                "Fatima Sana Shaikh".to_string(),
            ],
            source_id: 3,
            source_url: "https://en.wikipedia.org/?curid=3".to_string(),
        }
    }

    fn recommender(
        articles: MockArticleSource,
        completions: MockCompletionSource,
    ) -> Recommender {
        Recommender::new(Arc::new(articles), Arc::new(completions), 2)
    }

    #[tokio::test]
    async fn test_generative_path_enriches_stubs() {
        let mut completions = MockCompletionSource::new();
        completions.expect_complete().times(1).returning(|_| {
            Ok(r#"Here you go:
{"genreMovies": [{"title": "Chak De! India", "year": "2007", "description": "Also a sports drama"}],
 "directorMovies": [{"title": "Chhichhore", "year": "2019", "description": "Same director"}],
 "actorMovies": []}"#
                .to_string())
        });

        let set = recommender(enrichment_source(), completions)
            .build_recommendations("Dangal", &seed_record())
            .await;

        assert_eq!(set.genre_movies.len(), 1);
        assert_eq!(set.genre_movies[0].title, "Chak De! India");
        assert_eq!(set.director_movies.len(), 1);
        assert_eq!(set.director_movies[0].title, "Chhichhore");
        assert!(set.actor_movies.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_never_propagates() {
        let mut completions = MockCompletionSource::new();
        completions
            .expect_complete()
            .returning(|_| Err(AppError::Generative("connection reset".to_string())));

        let mut articles = MockArticleSource::new();
        articles.expect_search().returning(|_| Ok(Vec::new()));

        let set = recommender(articles, completions)
            .build_recommendations("Dangal", &seed_record())
            .await;

        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_empty_generative_result_invokes_miners() {
        let mut completions = MockCompletionSource::new();
        completions.expect_complete().returning(|_| {
            Ok(r#"{"genreMovies": [], "directorMovies": [], "actorMovies": []}"#.to_string())
        });

        let mut articles = MockArticleSource::new();
        articles.expect_search().returning(|query| {
            Ok(match query {
                "Nitesh Tiwari" => vec![hit(10, "Nitesh Tiwari")],
                "Chhichhore film" => vec![hit(page_id_for("Chhichhore"), "Chhichhore")],
                _ => Vec::new(),
            })
        });
        articles
            .expect_fetch_markup()
            .withf(|page_id| *page_id == 10)
            .returning(|_| Ok("== Filmography ==\n* '''[[Chhichhore]]'''\n".to_string()));
        articles.expect_fetch_page().returning(|id| Ok(page_for(id)));

        let set = recommender(articles, completions)
            .build_recommendations("Dangal", &seed_record())
            .await;

        assert_eq!(set.director_movies.len(), 1);
        assert_eq!(set.director_movies[0].title, "Chhichhore");
        assert!(set.genre_movies.is_empty());
        assert!(set.actor_movies.is_empty());
    }

    #[tokio::test]
    async fn test_dedup_excludes_seed_and_spans_categories() {
        let mut completions = MockCompletionSource::new();
        completions.expect_complete().returning(|_| {
            Ok(r#"{"genreMovies": [{"title": "Dangal"}, {"title": "Jersey"}],
                   "directorMovies": [{"title": "Jersey"}, {"title": "Chhichhore"}],
                   "actorMovies": [{"title": "jersey"}]}"#
                .to_string())
        });

        let set = recommender(enrichment_source(), completions)
            .build_recommendations("Dangal", &seed_record())
            .await;

        assert_eq!(set.genre_movies.len(), 1);
        assert_eq!(set.genre_movies[0].title, "Jersey");
        assert_eq!(set.director_movies.len(), 1);
        assert_eq!(set.director_movies[0].title, "Chhichhore");
        assert!(set.actor_movies.is_empty());

        // The global invariant: union of all lists plus the seed title has
        // no case-insensitive duplicates.
        let mut titles: Vec<String> = vec!["dangal".to_string()];
        for record in set
            .genre_movies
            .iter()
            .chain(&set.director_movies)
            .chain(&set.actor_movies)
        {
            titles.push(record.title.to_lowercase());
        }
        let distinct: HashSet<&String> = titles.iter().collect();
        assert_eq!(distinct.len(), titles.len());
    }

    #[tokio::test]
    async fn test_everything_failing_yields_empty_set() {
        let mut completions = MockCompletionSource::new();
        completions
            .expect_complete()
            .returning(|_| Err(AppError::Generative("no key".to_string())));

        let mut articles = MockArticleSource::new();
        articles
            .expect_search()
            .returning(|_| Err(AppError::ExternalApi("search down".to_string())));

        let set = recommender(articles, completions)
            .build_recommendations("Dangal", &seed_record())
            .await;

        assert!(set.is_empty());
    }

    #[test]
    fn test_first_json_object_plain() {
        assert_eq!(first_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_first_json_object_with_surrounding_prose() {
        let text = "Sure! Here is the JSON:\n```json\n{\"a\": {\"b\": 2}}\n```\nEnjoy.";
        assert_eq!(first_json_object(text), Some(r#"{"a": {"b": 2}}"#));
    }

    #[test]
    fn test_first_json_object_unbalanced() {
        assert_eq!(first_json_object("{\"a\": 1"), None);
        assert_eq!(first_json_object("no braces at all"), None);
    }

    #[test]
    fn test_build_prompt_embeds_metadata() {
        let prompt = build_prompt(&seed_record());
        assert!(prompt.contains("Title: Dangal"));
        assert!(prompt.contains("Genre: Drama, Sport"));
        assert!(prompt.contains("Director: Nitesh Tiwari"));
        assert!(prompt.contains("Year: 2016"));
        // Only the first three actors are named
        assert!(prompt.contains("Aamir Khan, Sakshi Tanwar, Fatima Sana Shaikh"));
        assert!(prompt.contains("Don't include the original movie"));
    }

    #[test]
    fn test_build_prompt_unknown_placeholders() {
        let seed = MovieRecord {
            title: "Obscure".to_string(),
            description: String::new(),
            image_url: None,
            year: None,
            genres: Vec::new(),
            director: String::new(),
            directors: Vec::new(),
            actors: Vec::new(),
            source_id: 1,
            source_url: String::new(),
        };
        let prompt = build_prompt(&seed);
        assert!(prompt.contains("Genre: Unknown"));
        assert!(prompt.contains("Director: Unknown"));
        assert!(prompt.contains("Year: Unknown"));
        assert!(prompt.contains("Actors: Unknown"));
    }
}
