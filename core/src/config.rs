//! Endpoint URL templates and client configuration.
//!
//! # Design
//! The upstream paths never change at runtime, so they are `const`s. Only
//! the host is configurable, which lets tests point the client at the mock
//! server while production code uses `DEFAULT_HOST`.

use std::env;
use std::time::Duration;

/// Production API host.
pub const DEFAULT_HOST: &str = "https://api.nytimes.com";

const TOP_STORIES_PATH: &str = "/svc/topstories/v2";
const MOST_POPULAR_PATH: &str = "/svc/mostpopular/v2";
const BOOKS_PATH: &str = "/svc/books/v3";
const MOVIE_REVIEWS_PATH: &str = "/svc/movies/v2/reviews/search.json";

pub const ENV_API_KEY: &str = "NYT_API_KEY";
pub const ENV_API_HOST: &str = "NYT_API_HOST";
pub const ENV_TIMEOUT_SECS: &str = "NYT_API_TIMEOUT_SECS";

/// Renders absolute URLs for every endpoint family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    host: String,
}

impl Endpoints {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn top_stories(&self, section: &str) -> String {
        format!("{}{TOP_STORIES_PATH}/{section}.json", self.host)
    }

    pub fn most_viewed(&self, days: u32) -> String {
        format!("{}{MOST_POPULAR_PATH}/viewed/{days}.json", self.host)
    }

    pub fn most_shared(&self, days: u32, method: Option<&str>) -> String {
        match method {
            Some(method) => format!("{}{MOST_POPULAR_PATH}/shared/{days}/{method}.json", self.host),
            None => format!("{}{MOST_POPULAR_PATH}/shared/{days}.json", self.host),
        }
    }

    pub fn book_reviews(&self) -> String {
        format!("{}{BOOKS_PATH}/reviews.json", self.host)
    }

    pub fn best_sellers_lists(&self) -> String {
        format!("{}{BOOKS_PATH}/lists/names.json", self.host)
    }

    pub fn best_sellers_list(&self, date: &str, name: &str) -> String {
        format!("{}{BOOKS_PATH}/lists/{date}/{name}.json", self.host)
    }

    pub fn movie_reviews(&self) -> String {
        format!("{}{MOVIE_REVIEWS_PATH}", self.host)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

/// Everything needed to construct a client.
///
/// A missing key is representable here; it only becomes an error when a
/// client is built from the config.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub endpoints: Endpoints,
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.endpoints = Endpoints::new(host);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `NYT_API_KEY`, `NYT_API_HOST` and `NYT_API_TIMEOUT_SECS`.
    ///
    /// Unset or unparsable optional variables fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty());
        let endpoints = lookup(ENV_API_HOST)
            .filter(|h| !h.trim().is_empty())
            .map(|h| Endpoints::new(h.trim()))
            .unwrap_or_default();
        let timeout = lookup(ENV_TIMEOUT_SECS)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        Self {
            api_key,
            endpoints,
            timeout,
        }
    }
}
