//! Stateless HTTP request builder and response parser for the NYT API.
//!
//! # Design
//! `NytClient` holds only the API key and the endpoint host, and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that validates its parameters and produces an `HttpRequest`, and a
//! `parse_*` method that unwraps the results envelope of an `HttpResponse`.
//! The caller (usually `NytApi`) executes the round-trip in between.

use serde_json::Value;

use crate::config::{ApiConfig, Endpoints};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::{
    date_range, page_budget, BookReviewFilter, ListDate, MovieOrder, MovieReviewQuery, Period,
    ShareMethod, DEFAULT_LIST_NAME, DEFAULT_MAX_RESULTS, DEFAULT_SECTION, MOVIE_PAGE_SIZE,
};

/// One upstream result, passed through untouched.
pub type Record = serde_json::Map<String, Value>;

/// Synchronous, stateless client for the NYT API.
#[derive(Debug, Clone)]
pub struct NytClient {
    api_key: String,
    endpoints: Endpoints,
}

/// A validated movie review search, ready to be paged through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieReviewSearch {
    params: Vec<(&'static str, String)>,
    pages: u32,
}

impl MovieReviewSearch {
    /// Maximum number of pages this search may fetch.
    pub fn pages(&self) -> u32 {
        self.pages
    }
}

/// One page of movie review results.
#[derive(Debug, Clone)]
pub struct MovieReviewPage {
    pub results: Vec<Record>,
    pub has_more: Option<bool>,
}

impl NytClient {
    /// Fails with `ApiError::Configuration` if `api_key` is blank.
    pub fn new(api_key: &str) -> Result<Self, ApiError> {
        Self::from_config(&ApiConfig::new(api_key))
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::Configuration("no API key supplied".to_string()))?;
        Ok(Self {
            api_key: api_key.to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn build_top_stories(&self, section: Option<&str>) -> Result<HttpRequest, ApiError> {
        let section = section.unwrap_or(DEFAULT_SECTION);
        if !is_slug(section) {
            return Err(ApiError::invalid(format!("invalid section {section:?}")));
        }
        Ok(self.get(self.endpoints.top_stories(section)))
    }

    pub fn build_most_viewed(&self, days: Option<u32>) -> Result<HttpRequest, ApiError> {
        let period = days.map(Period::try_from).transpose()?.unwrap_or_default();
        Ok(self.get(self.endpoints.most_viewed(period.days())))
    }

    pub fn build_most_shared(
        &self,
        days: Option<u32>,
        method: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let method = method.map(str::parse::<ShareMethod>).transpose()?;
        let period = days.map(Period::try_from).transpose()?.unwrap_or_default();
        let url = self
            .endpoints
            .most_shared(period.days(), method.map(ShareMethod::as_str));
        Ok(self.get(url))
    }

    pub fn build_book_reviews(
        &self,
        author: Option<&str>,
        isbn: Option<&str>,
        title: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let filter = BookReviewFilter::from_options(author, isbn, title)?;
        let (key, value) = filter.param();
        Ok(self.get(self.endpoints.book_reviews()).with_param(key, value))
    }

    pub fn build_best_sellers_lists(&self) -> HttpRequest {
        self.get(self.endpoints.best_sellers_lists())
    }

    pub fn build_best_sellers_list(
        &self,
        date: Option<ListDate>,
        name: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let date = date.unwrap_or_default().to_wire();
        let name = name.unwrap_or(DEFAULT_LIST_NAME);
        if !is_slug(name) {
            return Err(ApiError::invalid(format!("invalid list name {name:?}")));
        }
        Ok(self.get(self.endpoints.best_sellers_list(&date, name)))
    }

    /// Validate a movie review query once, before any page is requested.
    pub fn prepare_movie_reviews(
        &self,
        query: &MovieReviewQuery,
    ) -> Result<MovieReviewSearch, ApiError> {
        let order = query
            .order
            .as_deref()
            .map(str::parse::<MovieOrder>)
            .transpose()?;

        let mut params = Vec::new();
        if let Some(keyword) = &query.keyword {
            params.push(("query", keyword.clone()));
        }
        if query.critics_pick == Some(true) {
            params.push(("critics-pick", "Y".to_string()));
        }
        if let Some(reviewer) = &query.reviewer {
            params.push(("reviewer", reviewer.clone()));
        }
        if let Some(order) = order {
            params.push(("order", order.as_str().to_string()));
        }
        if let Some(range) = date_range(query.opening_date_start, query.opening_date_end) {
            params.push(("opening-date", range));
        }
        if let Some(range) = date_range(query.publication_date_start, query.publication_date_end) {
            params.push(("publication-date", range));
        }

        let max_results = query.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        Ok(MovieReviewSearch {
            params,
            pages: page_budget(max_results),
        })
    }

    /// Request for page `page` (zero-based) of a prepared search.
    pub fn build_movie_reviews_page(&self, search: &MovieReviewSearch, page: u32) -> HttpRequest {
        let mut req = self.get(self.endpoints.movie_reviews());
        for (key, value) in &search.params {
            req.push_param(key, value.as_str());
        }
        req.with_param("offset", (page * MOVIE_PAGE_SIZE).to_string())
    }

    /// Unwrap `results` from any endpoint that returns a flat result list.
    pub fn parse_results(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        let mut envelope = parse_envelope(response)?;
        let results = take_field(&mut envelope, "results")?;
        into_records(results)
    }

    /// Unwrap `results.books` from a best-seller list response.
    pub fn parse_best_sellers_list(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        let mut envelope = parse_envelope(response)?;
        let mut results = take_field(&mut envelope, "results")?;
        let books = take_field(&mut results, "books")
            .map_err(|_| ApiError::MissingField("results.books".to_string()))?;
        into_records(books)
    }

    /// Unwrap one page of movie reviews. A `null` result list is an empty
    /// page.
    pub fn parse_movie_reviews_page(
        &self,
        response: HttpResponse,
    ) -> Result<MovieReviewPage, ApiError> {
        let mut envelope = parse_envelope(response)?;
        let has_more = envelope.get("has_more").and_then(Value::as_bool);
        let results = match take_field(&mut envelope, "results")? {
            Value::Null => Vec::new(),
            other => into_records(other)?,
        };
        Ok(MovieReviewPage { results, has_more })
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest::get(url, &self.api_key)
    }
}

/// Upstream path segments are lowercase slugs: `[a-z0-9-]+`.
fn is_slug(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Map non-success status codes to `ApiError::HttpError`, then parse JSON.
fn parse_envelope(response: HttpResponse) -> Result<Value, ApiError> {
    if !response.is_success() {
        return Err(ApiError::HttpError {
            status: response.status,
            body: response.body,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn take_field(value: &mut Value, field: &str) -> Result<Value, ApiError> {
    value
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ApiError::MissingField(field.to_string()))
}

fn into_records(value: Value) -> Result<Vec<Record>, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn client() -> NytClient {
        NytClient::from_config(&ApiConfig::new("test-key").with_host("http://localhost:3000"))
            .unwrap()
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = NytClient::from_config(&ApiConfig::default()).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert!(matches!(
            NytClient::new("  ").unwrap_err(),
            ApiError::Configuration(_)
        ));
        assert_eq!(NytClient::new("k").unwrap().api_key(), "k");
    }

    #[test]
    fn api_key_is_stored_verbatim() {
        let client = NytClient::new(" spaced key ").unwrap();
        assert_eq!(client.api_key(), " spaced key ");
        let req = client.build_best_sellers_lists();
        assert_eq!(req.query_value("api-key"), Some(" spaced key "));
    }

    #[test]
    fn top_stories_defaults_to_home() {
        let req = client().build_top_stories(None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/svc/topstories/v2/home.json");
        assert_eq!(req.query, vec![("api-key".to_string(), "test-key".to_string())]);

        let req = client().build_top_stories(Some("science")).unwrap();
        assert_eq!(req.url, "http://localhost:3000/svc/topstories/v2/science.json");
    }

    #[test]
    fn top_stories_rejects_path_like_sections() {
        assert!(client().build_top_stories(Some("")).is_err());
        assert!(client().build_top_stories(Some("../books")).is_err());
    }

    #[test]
    fn path_segments_must_be_slugs() {
        for bad in ["home.json?x=1#", "home#frag", "home?x=1", "..", "sci%2Fence", "Home", "a b"] {
            assert!(
                matches!(client().build_top_stories(Some(bad)), Err(ApiError::InvalidArgument(_))),
                "section {bad:?}"
            );
            assert!(
                matches!(
                    client().build_best_sellers_list(None, Some(bad)),
                    Err(ApiError::InvalidArgument(_))
                ),
                "list name {bad:?}"
            );
        }
        assert!(client().build_top_stories(Some("nyregion")).is_ok());
        assert!(client().build_best_sellers_list(None, Some("young-adult-hardcover")).is_ok());
    }

    #[test]
    fn most_viewed_validates_days() {
        let req = client().build_most_viewed(None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/svc/mostpopular/v2/viewed/1.json");
        let req = client().build_most_viewed(Some(30)).unwrap();
        assert_eq!(req.url, "http://localhost:3000/svc/mostpopular/v2/viewed/30.json");
        let err = client().build_most_viewed(Some(3)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn most_shared_with_and_without_method() {
        let req = client().build_most_shared(Some(7), None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/svc/mostpopular/v2/shared/7.json");
        let req = client().build_most_shared(None, Some("facebook")).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/svc/mostpopular/v2/shared/1/facebook.json"
        );
    }

    #[test]
    fn most_shared_rejects_bad_inputs() {
        assert!(matches!(
            client().build_most_shared(Some(2), None),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            client().build_most_shared(Some(7), Some("myspace")),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn book_reviews_sends_only_the_given_filter() {
        let req = client()
            .build_book_reviews(None, Some("9781524763138"), None)
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/svc/books/v3/reviews.json");
        assert_eq!(req.query_value("isbn"), Some("9781524763138"));
        assert_eq!(req.query_value("author"), None);
        assert_eq!(req.query_value("title"), None);
        assert_eq!(req.query.len(), 2);
    }

    #[test]
    fn book_reviews_rejects_zero_or_many_filters() {
        assert!(matches!(
            client().build_book_reviews(None, None, None),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            client().build_book_reviews(Some("Michelle Obama"), None, Some("Becoming")),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn best_sellers_list_defaults() {
        let req = client().build_best_sellers_list(None, None).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/svc/books/v3/lists/current/combined-print-and-e-book-fiction.json"
        );
        let req = client()
            .build_best_sellers_list(Some(date(2019, 1, 1).into()), Some("hardcover-fiction"))
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/svc/books/v3/lists/2019-01-01/hardcover-fiction.json"
        );
    }

    #[test]
    fn best_sellers_lists_url() {
        let req = client().build_best_sellers_lists();
        assert_eq!(req.url, "http://localhost:3000/svc/books/v3/lists/names.json");
    }

    #[test]
    fn movie_reviews_params() {
        let query = MovieReviewQuery::default()
            .keyword("matrix")
            .critics_pick(true)
            .reviewer("Janet Maslin")
            .order("by-opening-date")
            .opening_dates(Some(date(1999, 1, 1)), Some(date(1999, 12, 31)))
            .publication_dates(None, Some(date(2000, 6, 1)));
        let search = client().prepare_movie_reviews(&query).unwrap();
        assert_eq!(search.pages(), 1);

        let req = client().build_movie_reviews_page(&search, 0);
        assert_eq!(
            req.url,
            "http://localhost:3000/svc/movies/v2/reviews/search.json"
        );
        assert_eq!(req.query_value("query"), Some("matrix"));
        assert_eq!(req.query_value("critics-pick"), Some("Y"));
        assert_eq!(req.query_value("reviewer"), Some("Janet Maslin"));
        assert_eq!(req.query_value("order"), Some("by-opening-date"));
        assert_eq!(req.query_value("opening-date"), Some("1999-01-01;1999-12-31"));
        assert_eq!(req.query_value("publication-date"), Some("1900-01-01;2000-06-01"));
        assert_eq!(req.query_value("offset"), Some("0"));
    }

    #[test]
    fn publication_range_uses_its_own_start() {
        let query = MovieReviewQuery::default()
            .opening_dates(Some(date(1980, 1, 1)), None)
            .publication_dates(Some(date(2005, 3, 4)), Some(date(2006, 3, 4)));
        let search = client().prepare_movie_reviews(&query).unwrap();
        let req = client().build_movie_reviews_page(&search, 0);
        assert_eq!(req.query_value("opening-date"), Some("1980-01-01;"));
        assert_eq!(req.query_value("publication-date"), Some("2005-03-04;2006-03-04"));
    }

    #[test]
    fn movie_reviews_critics_false_sends_nothing() {
        let query = MovieReviewQuery::default().critics_pick(false);
        let search = client().prepare_movie_reviews(&query).unwrap();
        let req = client().build_movie_reviews_page(&search, 2);
        assert_eq!(req.query_value("critics-pick"), None);
        assert_eq!(req.query_value("offset"), Some("40"));
    }

    #[test]
    fn movie_reviews_rejects_unknown_order() {
        let query = MovieReviewQuery::default().order("by-rating");
        assert!(matches!(
            client().prepare_movie_reviews(&query),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn movie_reviews_page_budget() {
        let c = client();
        let default = c.prepare_movie_reviews(&MovieReviewQuery::default()).unwrap();
        assert_eq!(default.pages(), 1);
        let search = c
            .prepare_movie_reviews(&MovieReviewQuery::default().max_results(45))
            .unwrap();
        assert_eq!(search.pages(), 3);
    }

    #[test]
    fn parse_results_returns_records() {
        let records = client()
            .parse_results(ok(r#"{"status":"OK","num_results":2,"results":[{"title":"a"},{"title":"b"}]}"#))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["title"], "b");
    }

    #[test]
    fn parse_results_missing_field() {
        let err = client().parse_results(ok(r#"{"status":"OK"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::MissingField(f) if f == "results"));
    }

    #[test]
    fn parse_results_non_2xx_is_http_error() {
        let response = HttpResponse {
            status: 401,
            headers: Vec::new(),
            body: r#"{"fault":{"faultstring":"Invalid ApiKey"}}"#.to_string(),
        };
        let err = client().parse_results(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 401, ref body } if body.contains("Invalid ApiKey")));
    }

    #[test]
    fn parse_results_bad_json() {
        let err = client().parse_results(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        let err = client().parse_results(ok(r#"{"results":[1,2]}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_best_sellers_list_reads_books() {
        let body = r#"{"results":{"list_name":"Hardcover Fiction","books":[{"rank":1},{"rank":2},{"rank":3}]}}"#;
        let books = client().parse_best_sellers_list(ok(body)).unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(books[0]["rank"], 1);

        let err = client()
            .parse_best_sellers_list(ok(r#"{"results":{"list_name":"x"}}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingField(f) if f == "results.books"));
    }

    #[test]
    fn parse_movie_page_reads_has_more() {
        let page = client()
            .parse_movie_reviews_page(ok(r#"{"has_more":true,"results":[{"display_title":"Heat"}]}"#))
            .unwrap();
        assert_eq!(page.has_more, Some(true));
        assert_eq!(page.results.len(), 1);

        let page = client()
            .parse_movie_reviews_page(ok(r#"{"has_more":false,"results":null}"#))
            .unwrap();
        assert_eq!(page.has_more, Some(false));
        assert!(page.results.is_empty());

        let page = client()
            .parse_movie_reviews_page(ok(r#"{"results":[]}"#))
            .unwrap();
        assert_eq!(page.has_more, None);
    }
}
