//! TMDB-backed movie repository.
//!
//! Fetches the top-rated list and one discover list per genre over HTTP and
//! keeps the latest result of each in a [`FeedCache`], which is what the
//! raw feeds read from.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};

use super::{FeedCache, FeedError, FeedStream, Genre, Movie, MovieList, MovieRepository, Section};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<MovieDto>,
}

#[derive(Debug, Deserialize)]
struct MovieDto {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

/// A repository reading from the TMDB v3 API.
pub struct TmdbRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    top_rated: FeedCache,
    genres: HashMap<Genre, FeedCache>,
}

impl TmdbRepository {
    /// Create a repository for the top-rated list and the given genres.
    ///
    /// # Arguments
    ///
    /// * `base_url` — API root without trailing slash (see
    ///   [`DEFAULT_BASE_URL`]).
    /// * `api_key` — TMDB v3 API key.
    /// * `genres` — genres whose feeds will be served.  Feeds for any other
    ///   genre never emit.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, genres: &[Genre]) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            top_rated: FeedCache::new(),
            genres: genres.iter().map(|g| (*g, FeedCache::new())).collect(),
        }
    }

    /// Decode one page of results into [`Movie`]s, keeping upstream order.
    ///
    /// Pure function (no I/O) so the decoding can be tested without the
    /// network.  Entries without a title are skipped; a missing poster path
    /// becomes an empty one.
    pub fn parse_page(body: &[u8]) -> Result<MovieList, FeedError> {
        let page: Page = serde_json::from_slice(body)?;
        Ok(page
            .results
            .into_iter()
            .filter_map(|dto| {
                let title = dto.title?;
                Some(Movie::new(title, dto.poster_path.unwrap_or_default()))
            })
            .collect())
    }

    fn endpoint(&self, section: Section) -> (String, Vec<(&'static str, String)>) {
        match section {
            Section::TopRated => (format!("{}/movie/top_rated", self.base_url), Vec::new()),
            Section::Genre(genre) => (
                format!("{}/discover/movie", self.base_url),
                vec![("with_genres", genre.tmdb_id().to_string())],
            ),
        }
    }

    async fn fetch(&self, section: Section) -> Result<MovieList, FeedError> {
        let (url, mut query) = self.endpoint(section);
        query.push(("api_key", self.api_key.clone()));

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Self::parse_page(&body)
    }

    fn cache(&self, section: Section) -> Option<&FeedCache> {
        match section {
            Section::TopRated => Some(&self.top_rated),
            Section::Genre(genre) => self.genres.get(&genre),
        }
    }

    async fn refresh_section(&self, section: Section) -> Result<(), FeedError> {
        let Some(cache) = self.cache(section) else {
            warn!(%section, "refresh requested for an untracked section");
            return Ok(());
        };
        match self.fetch(section).await {
            Ok(movies) => {
                info!(%section, count = movies.len(), "section refreshed");
                cache.store(movies);
                Ok(())
            }
            Err(err) => {
                warn!(%section, error = %err, "section refresh failed");
                cache.fail(err.clone());
                Err(err)
            }
        }
    }
}

#[async_trait]
impl MovieRepository for TmdbRepository {
    fn top_rated_stream(&self) -> FeedStream {
        self.top_rated.stream()
    }

    fn genre_stream(&self, genre: Genre) -> FeedStream {
        match self.genres.get(&genre) {
            Some(cache) => cache.stream(),
            None => futures::stream::pending().boxed(),
        }
    }

    async fn refresh_top_rated(&self) -> Result<(), FeedError> {
        self.refresh_section(Section::TopRated).await
    }

    async fn refresh_genre(&self, genre: Genre) -> Result<(), FeedError> {
        self.refresh_section(Section::Genre(genre)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
