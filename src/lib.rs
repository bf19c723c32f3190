pub mod api;
pub mod config;
pub mod film;
pub mod likes;
pub mod pager;
pub mod search;
pub mod session;
pub mod tmdb;
pub mod util;
pub mod wizard;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Backend error: {0}")]
    Api(#[from] api::ApiError),
    #[error("Catalog error: {0}")]
    Tmdb(#[from] tmdb::TmdbError),
    #[error("{0}")]
    Validation(#[from] wizard::ValidationError),
    #[error("Liked-movies error: {0}")]
    Likes(#[from] likes::LikeError),
}
