use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{MovieRecord, RecommendationSet},
    seed::{self, SeedMovie},
    services::movie_lookup,
};

use super::AppState;

/// Placeholder poster for records without a resolvable image
const FALLBACK_IMAGE: &str = "https://via.placeholder.com/300x450?text=Movie+Poster";
const HOME_PAGE_SIZE: usize = 10;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PostMovieRequest {
    pub moviename: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MoreMoviesRequest {
    /// Seed movie to expand from; defaults to the first static seed movie
    #[serde(default)]
    pub title: Option<String>,
}

/// Client-facing movie shape: lists joined, missing image replaced by the
/// placeholder poster
#[derive(Debug, Serialize, PartialEq)]
pub struct MovieResponse {
    pub title: String,
    pub img: String,
    pub description: String,
    pub genre: String,
    pub director: String,
    pub actors: String,
    pub year: String,
}

impl From<&MovieRecord> for MovieResponse {
    fn from(record: &MovieRecord) -> Self {
        let description = if record.description.is_empty() {
            format!("Information about {}", record.title)
        } else {
            record.description.clone()
        };

        Self {
            title: record.title.clone(),
            img: record
                .image_url
                .clone()
                .unwrap_or_else(|| FALLBACK_IMAGE.to_string()),
            description,
            genre: record.genres.join(", "),
            director: record.director.clone(),
            actors: record.actors.join(", "),
            year: record.year.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarMoviesResponse {
    pub genre_movies: Vec<MovieResponse>,
    pub director_movies: Vec<MovieResponse>,
    pub actor_movies: Vec<MovieResponse>,
}

impl From<&RecommendationSet> for SimilarMoviesResponse {
    fn from(set: &RecommendationSet) -> Self {
        Self {
            genre_movies: set.genre_movies.iter().map(MovieResponse::from).collect(),
            director_movies: set.director_movies.iter().map(MovieResponse::from).collect(),
            actor_movies: set.actor_movies.iter().map(MovieResponse::from).collect(),
        }
    }
}

// Handlers

/// Initial movie list shown before any search
pub async fn home() -> Json<Value> {
    let movies: Vec<&SeedMovie> = seed::SEED_MOVIES.iter().take(HOME_PAGE_SIZE).collect();
    Json(json!({
        "status": "success",
        "data": { "movies": movies }
    }))
}

/// Looks up a movie by name and builds its similar-movie recommendations
pub async fn post_movie(
    State(state): State<AppState>,
    Json(request): Json<PostMovieRequest>,
) -> AppResult<Json<Value>> {
    let name = request.moviename.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Movie name is required".to_string()));
    }

    tracing::info!(movie = %name, "Searching for movie");

    let record = movie_lookup::find_movie(state.articles.as_ref(), name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Movie \"{}\" not found. Please try a different title.",
                name
            ))
        })?;

    let similar = state.recommender.build_recommendations(name, &record).await;

    tracing::info!(
        movie = %record.title,
        genre = similar.genre_movies.len(),
        director = similar.director_movies.len(),
        actor = similar.actor_movies.len(),
        "Similar movies found"
    );

    let (status, message) = if similar.is_empty() {
        (
            "partial_success",
            "Found the movie, but couldn't find recommendations.",
        )
    } else {
        ("success", "Success")
    };

    Ok(Json(json!({
        "status": status,
        "message": message,
        "data": {
            "searchedMovie": MovieResponse::from(&record),
            "similarMovies": SimilarMoviesResponse::from(&similar),
        }
    })))
}

/// Expands the home list with genre-similar discoveries for a chosen seed
/// movie. The result is request-scoped: discovered movies lead the returned
/// list, followed by the static seeds.
pub async fn more_movies(
    State(state): State<AppState>,
    Json(request): Json<MoreMoviesRequest>,
) -> AppResult<Json<Value>> {
    let seed_title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(seed::title_case)
        .unwrap_or_else(|| seed::title_case(seed::SEED_MOVIES[0].title));

    let record = movie_lookup::find_movie(state.articles.as_ref(), &seed_title)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie information not found".to_string()))?;

    let similar = state
        .recommender
        .build_recommendations(&seed_title, &record)
        .await;

    let mut movies: Vec<Value> = Vec::new();
    for movie in &similar.genre_movies {
        movies.push(to_json(&MovieResponse::from(movie))?);
    }
    for seed_movie in seed::SEED_MOVIES {
        movies.push(to_json(seed_movie)?);
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Movies updated successfully",
        "data": {
            "searchedMovie": MovieResponse::from(&record),
            "movies": movies,
        }
    })))
}

fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MovieRecord {
        MovieRecord {
            title: "Dangal".to_string(),
            description: "Former wrestler trains his daughters.".to_string(),
            image_url: Some("https://upload.example/dangal.jpg".to_string()),
            year: Some("2016".to_string()),
            genres: vec!["Drama".to_string(), "Sport".to_string()],
            director: "Nitesh Tiwari".to_string(),
            directors: vec!["Nitesh Tiwari".to_string()],
            actors: vec!["Aamir Khan".to_string(), "Sakshi Tanwar".to_string()],
            source_id: 1,
            source_url: "https://en.wikipedia.org/?curid=1".to_string(),
        }
    }

    #[test]
    fn test_movie_response_joins_lists() {
        let response = MovieResponse::from(&record());
        assert_eq!(response.genre, "Drama, Sport");
        assert_eq!(response.actors, "Aamir Khan, Sakshi Tanwar");
        assert_eq!(response.year, "2016");
        assert_eq!(response.img, "https://upload.example/dangal.jpg");
    }

    #[test]
    fn test_movie_response_substitutes_placeholder_image() {
        let mut bare = record();
        bare.image_url = None;
        let response = MovieResponse::from(&bare);
        assert_eq!(response.img, FALLBACK_IMAGE);
    }

    #[test]
    fn test_movie_response_description_fallback() {
        let mut bare = record();
        bare.description = String::new();
        let response = MovieResponse::from(&bare);
        assert_eq!(response.description, "Information about Dangal");
    }

    #[test]
    fn test_similar_movies_response_camel_case() {
        let set = RecommendationSet {
            genre_movies: vec![record()],
            director_movies: Vec::new(),
            actor_movies: Vec::new(),
        };
        let json = serde_json::to_value(SimilarMoviesResponse::from(&set)).unwrap();
        assert_eq!(json["genreMovies"][0]["title"], "Dangal");
        assert!(json["directorMovies"].as_array().unwrap().is_empty());
    }
}
