use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AuthConfig;
use crate::film::{FilmDetail, FilmSummary};
use crate::likes::{LikeBackend, LikeError};
use crate::wizard::PreferenceSelection;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("Request to {0} failed: {1}")]
    Transport(String, reqwest::Error),
    #[error("{0} returned status {1}: {2}")]
    Status(String, u16, String),
    #[error("Not signed in")]
    Unauthenticated,
}

#[derive(Debug, Serialize)]
struct SimilarFilmsRequest<'a> {
    selected_film_id: &'a str,
}

#[derive(Debug, Serialize)]
struct DescribeRequest<'a> {
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct LikeRequest<'a> {
    #[serde(rename = "movieId")]
    movie_id: &'a str,
    liked: bool,
}

#[derive(Debug, Deserialize)]
struct LikedMoviesResponse {
    #[serde(rename = "likedMovies")]
    liked_movies: Vec<LikedMovie>,
}

#[derive(Debug, Deserialize)]
struct LikedMovie {
    id: String,
}

/// Client for the recommendation backend. The backend itself (ranking,
/// persistence) is an external collaborator; this client only speaks
/// its HTTP surface.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    auth: Option<AuthConfig>,
}

impl BackendClient {
    pub fn new(base_url: &str, auth: Option<AuthConfig>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let auth = self.auth.as_ref().ok_or(ApiError::Unauthenticated)?;
        let token = auth.token.as_deref().unwrap_or_default();
        Ok(req
            .header("Authorization", format!("Bearer {token}"))
            .header("User-ID", auth.user_id.clone()))
    }

    async fn read_films(&self, path: &str, response: reqwest::Response) -> Result<Vec<FilmSummary>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(path.to_string(), status.as_u16(), body));
        }

        // Tolerate individually malformed entries instead of failing the
        // whole result list.
        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;
        Ok(parse_films(values))
    }

    /// `POST /api/search_films`, the terminal wizard action.
    pub async fn search_films(
        &self,
        selection: &PreferenceSelection,
    ) -> Result<Vec<FilmSummary>, ApiError> {
        let path = "/api/search_films";
        let response = self
            .client
            .post(self.url(path))
            .json(selection)
            .send()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;
        self.read_films(path, response).await
    }

    /// `POST /api/search_similar_films`
    pub async fn search_similar_films(
        &self,
        selected_film_id: &str,
    ) -> Result<Vec<FilmSummary>, ApiError> {
        let path = "/api/search_similar_films";
        let response = self
            .client
            .post(self.url(path))
            .json(&SimilarFilmsRequest { selected_film_id })
            .send()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;
        self.read_films(path, response).await
    }

    /// `POST /api/search` for free-text description search.
    pub async fn search_by_description(
        &self,
        description: &str,
    ) -> Result<Vec<FilmSummary>, ApiError> {
        let path = "/api/search";
        let response = self
            .client
            .post(self.url(path))
            .json(&DescribeRequest { description })
            .send()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;
        self.read_films(path, response).await
    }

    /// `GET /api/film/:id`
    pub async fn film_detail(&self, id: &str) -> Result<FilmDetail, ApiError> {
        let path = format!("/api/film/{}", urlencoding::encode(id));
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(path.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(path, status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Transport(path, e))
    }

    /// `GET /api/liked_movies`. Requires the auth headers.
    pub async fn liked_movies(&self) -> Result<Vec<String>, ApiError> {
        let path = "/api/liked_movies";
        let response = self
            .with_auth(self.client.get(self.url(path)))?
            .send()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(path.to_string(), status.as_u16(), body));
        }

        let body: LikedMoviesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;
        Ok(body.liked_movies.into_iter().map(|m| m.id).collect())
    }

    /// `POST /api/like_movie` to like, `DELETE` to unlike.
    pub async fn like_movie(&self, movie_id: &str, liked: bool) -> Result<(), ApiError> {
        let path = "/api/like_movie";
        let req = if liked {
            self.client.post(self.url(path))
        } else {
            self.client.delete(self.url(path))
        };

        let response = self
            .with_auth(req)?
            .json(&LikeRequest { movie_id, liked })
            .send()
            .await
            .map_err(|e| ApiError::Transport(path.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(path.to_string(), status.as_u16(), body));
        }
        Ok(())
    }
}

#[async_trait]
impl LikeBackend for BackendClient {
    async fn fetch_liked(&self) -> Result<Vec<String>, LikeError> {
        self.liked_movies().await.map_err(to_like_error)
    }

    async fn set_liked(&self, movie_id: &str, liked: bool) -> Result<(), LikeError> {
        self.like_movie(movie_id, liked).await.map_err(to_like_error)
    }
}

fn to_like_error(e: ApiError) -> LikeError {
    match e {
        ApiError::Status(_, status, body) => LikeError::Status(status, body),
        other => LikeError::Transport(other.to_string()),
    }
}

/// Convert a loosely-shaped response array into film summaries,
/// dropping entries that don't parse.
fn parse_films(values: Vec<serde_json::Value>) -> Vec<FilmSummary> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<FilmSummary>(value) {
            Ok(film) => Some(film),
            Err(e) => {
                warn!("skipping malformed film entry: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_entries_are_dropped_not_fatal() {
        let values = vec![
            json!({"id": "603", "title": "The Matrix", "cover_image": "/m.jpg"}),
            json!({"title": "missing id"}),
            json!({"id": "550", "title": "Fight Club", "cover_image": "/f.jpg", "year": 1999}),
        ];

        let films = parse_films(values);
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].id, "603");
        assert_eq!(films[1].year, Some(1999));
    }

    #[test]
    fn liked_movies_response_shape() {
        let body = json!({"likedMovies": [{"id": "603"}, {"id": "550"}]});
        let parsed: LikedMoviesResponse = serde_json::from_value(body).unwrap();
        let ids: Vec<String> = parsed.liked_movies.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["603", "550"]);
    }

    #[test]
    fn like_request_uses_wire_field_names() {
        let body = serde_json::to_value(LikeRequest {
            movie_id: "603",
            liked: true,
        })
        .unwrap();
        assert_eq!(body, json!({"movieId": "603", "liked": true}));
    }
}
