//! Blocking facade over `NytClient` and a `Transport`.
//!
//! # Design
//! `NytApi` is the one-call-per-endpoint surface: validate, build, execute,
//! parse. It adds nothing to the request/response core except the movie
//! review pagination loop, which repeats the search with an increasing
//! `offset` until a page reports `has_more: false` or the page budget
//! derived from `max_results` is spent.

use tracing::{debug, warn};

use crate::client::{MovieReviewSearch, NytClient, Record};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::params::{ListDate, MovieReviewQuery};

/// NYT API facade. Holds the API key (inside `NytClient`) and a transport.
#[derive(Debug, Clone)]
pub struct NytApi<T = UreqTransport> {
    client: NytClient,
    transport: T,
}

impl NytApi<UreqTransport> {
    /// Fails with `ApiError::Configuration` if `api_key` is blank.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        Self::from_config(&ApiConfig::new(api_key))
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = NytClient::from_config(config)?;
        Ok(Self::with_transport(client, UreqTransport::new(config.timeout)))
    }

    /// Configure from `NYT_API_KEY` and friends.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_config(&ApiConfig::from_env())
    }
}

impl<T: Transport> NytApi<T> {
    pub fn with_transport(client: NytClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &NytClient {
        &self.client
    }

    pub fn top_stories(&self, section: Option<&str>) -> Result<Vec<Record>, ApiError> {
        let req = self.client.build_top_stories(section)?;
        let response = self.execute(&req)?;
        self.client.parse_results(response)
    }

    pub fn most_viewed(&self, days: Option<u32>) -> Result<Vec<Record>, ApiError> {
        let req = self.client.build_most_viewed(days)?;
        let response = self.execute(&req)?;
        self.client.parse_results(response)
    }

    pub fn most_shared(
        &self,
        days: Option<u32>,
        method: Option<&str>,
    ) -> Result<Vec<Record>, ApiError> {
        let req = self.client.build_most_shared(days, method)?;
        let response = self.execute(&req)?;
        self.client.parse_results(response)
    }

    pub fn book_reviews(
        &self,
        author: Option<&str>,
        isbn: Option<&str>,
        title: Option<&str>,
    ) -> Result<Vec<Record>, ApiError> {
        let req = self.client.build_book_reviews(author, isbn, title)?;
        let response = self.execute(&req)?;
        self.client.parse_results(response)
    }

    pub fn best_sellers_lists(&self) -> Result<Vec<Record>, ApiError> {
        let req = self.client.build_best_sellers_lists();
        let response = self.execute(&req)?;
        self.client.parse_results(response)
    }

    pub fn best_sellers_list(
        &self,
        date: Option<ListDate>,
        name: Option<&str>,
    ) -> Result<Vec<Record>, ApiError> {
        let req = self.client.build_best_sellers_list(date, name)?;
        let response = self.execute(&req)?;
        self.client.parse_best_sellers_list(response)
    }

    /// Like `best_sellers_list`, with the date given as `current` or
    /// `YYYY-MM-DD` text.
    pub fn best_sellers_list_on(
        &self,
        date: &str,
        name: Option<&str>,
    ) -> Result<Vec<Record>, ApiError> {
        self.best_sellers_list(Some(ListDate::parse(date)?), name)
    }

    pub fn movie_reviews(&self, query: &MovieReviewQuery) -> Result<Vec<Record>, ApiError> {
        let search = self.client.prepare_movie_reviews(query)?;
        self.collect_movie_reviews(&search)
    }

    fn collect_movie_reviews(&self, search: &MovieReviewSearch) -> Result<Vec<Record>, ApiError> {
        let mut results = Vec::new();
        for page in 0..search.pages() {
            let req = self.client.build_movie_reviews_page(search, page);
            let response = self.execute(&req)?;
            let parsed = self.client.parse_movie_reviews_page(response)?;
            debug!(
                page,
                offset = req.query_value("offset"),
                received = parsed.results.len(),
                has_more = ?parsed.has_more,
                "movie reviews page"
            );
            results.extend(parsed.results);
            if parsed.has_more == Some(false) {
                break;
            }
        }
        Ok(results)
    }

    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(url = %req.url, params = req.query.len() - 1, "GET");
        let response = self.transport.execute(req)?;
        if !response.is_success() {
            warn!(url = %req.url, status = response.status, "upstream returned non-success status");
        }
        Ok(response)
    }
}
