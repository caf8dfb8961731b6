//! Validated request parameters.
//!
//! # Design
//! Each enumeration the upstream API accepts gets its own type with a
//! `FromStr`/`TryFrom` conversion that fails with `InvalidArgument`, and an
//! `as_str()` giving the exact wire form. The facade accepts raw values and
//! converts them here, so all validation happens before a request exists.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ApiError;

/// Page size of the movie review search endpoint.
pub const MOVIE_PAGE_SIZE: u32 = 20;

/// Default for `MovieReviewQuery::max_results`.
pub const DEFAULT_MAX_RESULTS: u32 = 20;

pub const DEFAULT_SECTION: &str = "home";
pub const DEFAULT_LIST_NAME: &str = "combined-print-and-e-book-fiction";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Look-back window of the most popular endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    pub fn days(self) -> u32 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

impl TryFrom<u32> for Period {
    type Error = ApiError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            1 => Ok(Period::Day),
            7 => Ok(Period::Week),
            30 => Ok(Period::Month),
            other => Err(ApiError::invalid(format!(
                "days must be 1, 7 or 30, got {other}"
            ))),
        }
    }
}

/// Sharing channel for the most shared endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMethod {
    Email,
    Facebook,
    Twitter,
}

impl ShareMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareMethod::Email => "email",
            ShareMethod::Facebook => "facebook",
            ShareMethod::Twitter => "twitter",
        }
    }
}

impl FromStr for ShareMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ShareMethod::Email),
            "facebook" => Ok(ShareMethod::Facebook),
            "twitter" => Ok(ShareMethod::Twitter),
            other => Err(ApiError::invalid(format!(
                "share method must be email, facebook or twitter, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ShareMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order of the movie review search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieOrder {
    ByOpeningDate,
    ByPublicationDate,
    ByTitle,
}

impl MovieOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            MovieOrder::ByOpeningDate => "by-opening-date",
            MovieOrder::ByPublicationDate => "by-publication-date",
            MovieOrder::ByTitle => "by-title",
        }
    }
}

impl FromStr for MovieOrder {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by-opening-date" => Ok(MovieOrder::ByOpeningDate),
            "by-publication-date" => Ok(MovieOrder::ByPublicationDate),
            "by-title" => Ok(MovieOrder::ByTitle),
            other => Err(ApiError::invalid(format!(
                "order must be by-opening-date, by-publication-date or by-title, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for MovieOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication date of a best-seller list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListDate {
    /// The most recently published list.
    #[default]
    Current,
    On(NaiveDate),
}

impl ListDate {
    /// Accepts `current` or a `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        if s == "current" {
            return Ok(ListDate::Current);
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(ListDate::On)
            .map_err(|_| ApiError::invalid(format!("list date must be a YYYY-MM-DD date, got {s:?}")))
    }

    pub fn to_wire(self) -> String {
        match self {
            ListDate::Current => "current".to_string(),
            ListDate::On(date) => format_date(date),
        }
    }
}

impl From<NaiveDate> for ListDate {
    fn from(date: NaiveDate) -> Self {
        ListDate::On(date)
    }
}

impl From<NaiveDateTime> for ListDate {
    fn from(datetime: NaiveDateTime) -> Self {
        ListDate::On(datetime.date())
    }
}

impl FromStr for ListDate {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListDate::parse(s)
    }
}

/// The single filter of a book review lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookReviewFilter {
    Author(String),
    Isbn(String),
    Title(String),
}

impl BookReviewFilter {
    /// Exactly one of the three must be non-empty.
    pub fn from_options(
        author: Option<&str>,
        isbn: Option<&str>,
        title: Option<&str>,
    ) -> Result<Self, ApiError> {
        fn set(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.trim().is_empty())
        }
        let (author, isbn, title) = (set(author), set(isbn), set(title));

        let count = [author, isbn, title].iter().filter(|v| v.is_some()).count();
        if count != 1 {
            return Err(ApiError::invalid(format!(
                "exactly one of author, isbn or title must be given, got {count}"
            )));
        }

        let filter = author
            .map(|a| BookReviewFilter::Author(a.to_string()))
            .or_else(|| isbn.map(|i| BookReviewFilter::Isbn(i.to_string())))
            .or_else(|| title.map(|t| BookReviewFilter::Title(t.to_string())));
        filter.ok_or_else(|| ApiError::invalid("one of author, isbn or title must be given"))
    }

    pub fn param(&self) -> (&'static str, &str) {
        match self {
            BookReviewFilter::Author(v) => ("author", v),
            BookReviewFilter::Isbn(v) => ("isbn", v),
            BookReviewFilter::Title(v) => ("title", v),
        }
    }
}

/// Search parameters for movie reviews. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieReviewQuery {
    pub keyword: Option<String>,
    pub critics_pick: Option<bool>,
    pub opening_date_start: Option<NaiveDate>,
    pub opening_date_end: Option<NaiveDate>,
    /// One of `by-opening-date`, `by-publication-date`, `by-title`.
    pub order: Option<String>,
    pub publication_date_start: Option<NaiveDate>,
    pub publication_date_end: Option<NaiveDate>,
    pub reviewer: Option<String>,
    /// Defaults to 20. Results are fetched in whole pages of 20.
    pub max_results: Option<u32>,
}

impl MovieReviewQuery {
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn critics_pick(mut self, critics_pick: bool) -> Self {
        self.critics_pick = Some(critics_pick);
        self
    }

    pub fn opening_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.opening_date_start = start;
        self.opening_date_end = end;
        self
    }

    pub fn publication_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.publication_date_start = start;
        self.publication_date_end = end;
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// Number of pages needed to cover `max_results`.
pub fn page_budget(max_results: u32) -> u32 {
    max_results.div_ceil(MOVIE_PAGE_SIZE)
}

/// Serialize a date range as `start;end`.
///
/// A range with only an end date starts at 1900-01-01; a range with only a
/// start date has an empty end.
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    let start = match (start, end) {
        (None, None) => return None,
        (Some(start), _) => start,
        (None, Some(_)) => NaiveDate::from_ymd_opt(1900, 1, 1)?,
    };
    let end = end.map(format_date).unwrap_or_default();
    Some(format!("{};{end}", format_date(start)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
