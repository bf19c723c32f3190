use std::sync::Arc;

use tracing::{info, warn};

use crate::api::BackendClient;
use crate::config::{Config, ConfigError};
use crate::film::{Actor, FilmDetail, FilmSummary};
use crate::likes::{LikeStore, LikedCache};
use crate::pager::ResultPager;
use crate::search::{DebouncedSearch, SearchError};
use crate::tmdb::{ActorSearch, TitleSearch, TmdbClient};
use crate::wizard::{Advance, Preferences, StepSequencer};
use crate::Error;

/// One user's sitting with the app: wizard state, search inputs, the
/// liked-movie store, and the current result pager.
pub struct Session {
    backend: BackendClient,
    tmdb: Arc<TmdbClient>,
    prefs: Preferences,
    sequencer: StepSequencer,
    likes: Arc<LikeStore>,
    actor_search: DebouncedSearch<ActorSearch>,
    title_search: DebouncedSearch<TitleSearch>,
    results: Option<ResultPager>,
}

impl Session {
    /// Build a session from config and reconcile the liked set against
    /// the server. The remote fetch is best-effort; failure keeps the
    /// locally cached set.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let api_key = config.tmdb_api_key().ok_or(ConfigError::MissingTmdbKey)?;
        let tmdb = Arc::new(TmdbClient::new(api_key)?);

        let backend = BackendClient::new(&config.backend.base_url, config.auth.clone())?;

        let cache = LikedCache::new(&config.cache_dir());
        let like_backend: Option<Arc<dyn crate::likes::LikeBackend>> = if backend.is_authenticated()
        {
            Some(Arc::new(backend.clone()))
        } else {
            None
        };
        let likes = Arc::new(LikeStore::new(cache, like_backend));

        if backend.is_authenticated() {
            if let Err(e) = likes.sync_remote().await {
                warn!("could not fetch liked movies from server: {}", e);
            }
        }

        Ok(Self {
            backend,
            tmdb: Arc::clone(&tmdb),
            prefs: Preferences::new(),
            sequencer: StepSequencer::new(),
            likes,
            actor_search: DebouncedSearch::new(Arc::new(ActorSearch::new(Arc::clone(&tmdb)))),
            title_search: DebouncedSearch::new(Arc::new(TitleSearch::new(tmdb))),
            results: None,
        })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.prefs
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn likes(&self) -> &Arc<LikeStore> {
        &self.likes
    }

    pub fn results(&self) -> Option<&ResultPager> {
        self.results.as_ref()
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultPager> {
        self.results.as_mut()
    }

    /// Feed actor-search keystrokes; results settle after the quiet
    /// period and land in [`Session::actor_results`].
    pub fn type_actor_query(&self, query: &str) {
        self.actor_search.input(query);
    }

    pub fn actor_results(&self) -> Vec<Actor> {
        self.actor_search.current()
    }

    /// Failure from the most recent settled actor lookup, for the UI's
    /// retry message.
    pub fn actor_search_error(&self) -> Option<SearchError> {
        self.actor_search.last_error()
    }

    pub fn type_title_query(&self, query: &str) {
        self.title_search.input(query);
    }

    pub fn title_results(&self) -> Vec<FilmSummary> {
        self.title_search.current()
    }

    pub fn title_search_error(&self) -> Option<SearchError> {
        self.title_search.last_error()
    }

    /// Advance the wizard; on the final step this fires the
    /// recommendation request and fills the result pager.
    pub async fn advance(&mut self) -> Result<Advance, Error> {
        let advance = self.sequencer.advance(&self.prefs)?;
        if advance == Advance::Finished {
            info!("fetching recommendations for {}", self.prefs.location("/"));
            let films = self.backend.search_films(&self.prefs.selection()).await?;
            self.results = Some(ResultPager::new(films));
        }
        Ok(advance)
    }

    pub fn retreat(&mut self) {
        self.sequencer.retreat();
    }

    /// "Start Over": back to the first step with an empty selection.
    pub fn start_over(&mut self) {
        self.sequencer.reset();
        self.prefs.clear();
        self.results = None;
    }

    /// Fetch films similar to `film_id` into the pager. The title
    /// search results are superseded by the new list, as the original
    /// flow clears them.
    pub async fn find_similar(&mut self, film_id: &str) -> Result<&ResultPager, Error> {
        let films = self.backend.search_similar_films(film_id).await?;
        self.title_search.input("");
        Ok(self.results.insert(ResultPager::new(films)))
    }

    /// Free-text description search into the pager.
    pub async fn describe(&mut self, description: &str) -> Result<&ResultPager, Error> {
        let films = self.backend.search_by_description(description).await?;
        Ok(self.results.insert(ResultPager::new(films)))
    }

    pub async fn film_detail(&self, id: &str) -> Result<FilmDetail, Error> {
        Ok(self.backend.film_detail(id).await?)
    }

    pub async fn toggle_like(&self, movie_id: &str, liked: bool) {
        self.likes.toggle(movie_id, liked).await;
    }

    /// The liked set enriched with catalog metadata. A film whose
    /// lookup fails degrades to its bare id and a placeholder poster.
    pub async fn liked_films(&self) -> Vec<FilmSummary> {
        let ids = self.likes.snapshot();
        let mut films = Vec::with_capacity(ids.len());
        for id in ids.iter() {
            match self.tmdb.movie_by_id(id).await {
                Ok(film) => films.push(film),
                Err(e) => {
                    warn!("could not enrich liked movie {}: {}", id, e);
                    films.push(FilmSummary::new(id.clone(), id.clone(), "/placeholder.svg"));
                }
            }
        }
        films
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{Section, ValidationError};

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            backend: Default::default(),
            tmdb: crate::config::TmdbConfig {
                api_key: Some("test-key".into()),
            },
            cachedir: Some(dir.path().to_string_lossy().to_string()),
            auth: None,
        }
    }

    #[tokio::test]
    async fn advance_without_selection_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::connect(&test_config(&dir)).await.unwrap();

        let err = session.advance().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingSelection(_))
        ));
        assert_eq!(session.sequencer().current_index(), 0);
    }

    #[tokio::test]
    async fn start_over_clears_selection_and_location() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::connect(&test_config(&dir)).await.unwrap();

        session.preferences_mut().set_mood(Some("Funny".into()));
        session.advance().await.unwrap();

        session.start_over();
        assert_eq!(session.sequencer().current_index(), 0);
        assert_eq!(session.sequencer().section(), Section::Preferences);
        assert!(session.preferences().mood().is_none());
        assert_eq!(session.preferences().location("/"), "/");
        assert!(session.results().is_none());
    }

    #[tokio::test]
    async fn anonymous_session_like_is_local_noop() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::connect(&test_config(&dir)).await.unwrap();

        session.toggle_like("603", true).await;
        assert!(session.likes().snapshot().is_empty());
    }
}
