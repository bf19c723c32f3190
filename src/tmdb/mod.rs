use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::film::{Actor, FilmSummary};
use crate::search::{SearchBackend, SearchError};

const API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER: &str = "/placeholder.svg";

// Poster widths the original app requested per surface.
const PROFILE_WIDTH: &str = "w92";
const SEARCH_POSTER_WIDTH: &str = "w200";
const DETAIL_POSTER_WIDTH: &str = "w500";

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("TMDB request to {0} failed: {1}")]
    Transport(String, reqwest::Error),
    #[error("TMDB {0} returned status {1}")]
    Status(String, u16),
}

#[derive(Debug, Deserialize)]
struct PersonResults {
    #[serde(default)]
    results: Vec<PersonPayload>,
}

#[derive(Debug, Deserialize)]
struct PersonPayload {
    id: i64,
    name: String,
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieResults {
    #[serde(default)]
    results: Vec<MoviePayload>,
}

#[derive(Debug, Deserialize)]
struct MoviePayload {
    id: i64,
    title: String,
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    release_date: Option<String>,
}

/// Client for the third-party movie catalog, keyed by a public API key
/// and queried directly (no backend in between).
#[derive(Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self, TmdbError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TmdbError::Client)?;

        Ok(Self { client, api_key })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        let url = format!("{API_BASE}{path}");
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| TmdbError::Transport(path.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status(path.to_string(), status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TmdbError::Transport(path.to_string(), e))
    }

    /// Search people by name. Entries without a profile image are
    /// dropped; the pick list only shows faces.
    pub async fn search_person(&self, query: &str) -> Result<Vec<Actor>, TmdbError> {
        let body: PersonResults = self.get("/search/person", &[("query", query)]).await?;
        Ok(body
            .results
            .into_iter()
            .filter_map(convert_person)
            .collect())
    }

    /// Search films by title.
    pub async fn search_movie(&self, query: &str) -> Result<Vec<FilmSummary>, TmdbError> {
        let body: MovieResults = self.get("/search/movie", &[("query", query)]).await?;
        Ok(body
            .results
            .into_iter()
            .map(|m| convert_movie(m, SEARCH_POSTER_WIDTH))
            .collect())
    }

    /// Fetch one film by catalog id, used to enrich bare liked IDs.
    pub async fn movie_by_id(&self, id: &str) -> Result<FilmSummary, TmdbError> {
        let path = format!("/movie/{}", urlencoding::encode(id));
        let movie: MoviePayload = self.get(&path, &[]).await?;
        Ok(convert_movie(movie, DETAIL_POSTER_WIDTH))
    }
}

fn convert_person(person: PersonPayload) -> Option<Actor> {
    let profile_path = person.profile_path?;
    Some(Actor {
        id: person.id,
        name: person.name,
        profile_path: Some(format!("{IMAGE_BASE}/{PROFILE_WIDTH}{profile_path}")),
    })
}

fn convert_movie(movie: MoviePayload, poster_width: &str) -> FilmSummary {
    let cover_image = match movie.poster_path {
        Some(path) => format!("{IMAGE_BASE}/{poster_width}{path}"),
        None => PLACEHOLDER.to_string(),
    };

    let year = movie.release_date.as_deref().and_then(parse_year);
    if movie.release_date.is_some() && year.is_none() {
        warn!("unparseable release date for movie {}", movie.id);
    }

    FilmSummary {
        id: movie.id.to_string(),
        title: movie.title,
        cover_image,
        rating: movie.vote_average,
        year,
        genres: None,
    }
}

fn parse_year(release_date: &str) -> Option<i32> {
    release_date.get(..4)?.parse().ok()
}

/// Debounced actor-name search over the catalog's people index.
pub struct ActorSearch {
    client: Arc<TmdbClient>,
}

impl ActorSearch {
    pub fn new(client: Arc<TmdbClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for ActorSearch {
    type Item = Actor;

    async fn search(&self, query: &str) -> Result<Vec<Actor>, SearchError> {
        self.client
            .search_person(query)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))
    }
}

/// Debounced film-title search over the catalog.
pub struct TitleSearch {
    client: Arc<TmdbClient>,
}

impl TitleSearch {
    pub fn new(client: Arc<TmdbClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for TitleSearch {
    type Item = FilmSummary;

    async fn search(&self, query: &str) -> Result<Vec<FilmSummary>, SearchError> {
        self.client
            .search_movie(query)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn people_without_profile_images_are_dropped() {
        let faceless = PersonPayload {
            id: 1,
            name: "Nobody".into(),
            profile_path: None,
        };
        assert!(convert_person(faceless).is_none());

        let actor = convert_person(PersonPayload {
            id: 3223,
            name: "Robert Downey Jr.".into(),
            profile_path: Some("/rdj.jpg".into()),
        })
        .unwrap();
        assert_eq!(
            actor.profile_path.as_deref(),
            Some("https://image.tmdb.org/t/p/w92/rdj.jpg")
        );
    }

    #[test]
    fn missing_poster_falls_back_to_placeholder() {
        let film = convert_movie(
            MoviePayload {
                id: 603,
                title: "The Matrix".into(),
                poster_path: None,
                vote_average: Some(8.2),
                release_date: Some("1999-03-30".into()),
            },
            SEARCH_POSTER_WIDTH,
        );
        assert_eq!(film.cover_image, PLACEHOLDER);
        assert_eq!(film.year, Some(1999));
        assert_eq!(film.rating, Some(8.2));
    }

    #[test]
    fn poster_path_expands_with_requested_width() {
        let film = convert_movie(
            MoviePayload {
                id: 550,
                title: "Fight Club".into(),
                poster_path: Some("/fc.jpg".into()),
                vote_average: None,
                release_date: None,
            },
            DETAIL_POSTER_WIDTH,
        );
        assert_eq!(film.cover_image, "https://image.tmdb.org/t/p/w500/fc.jpg");
        assert_eq!(film.year, None);
    }

    #[test]
    fn results_field_may_be_absent() {
        let parsed: MovieResults = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
