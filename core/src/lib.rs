//! Synchronous client for the New York Times developer API.
//!
//! # Overview
//! Covers the read-only endpoints for top stories, most viewed and most
//! shared articles, book reviews, best-seller lists and movie reviews.
//! Every call validates its parameters, issues one or more GET requests with
//! the `api-key` query parameter, and unwraps the `results` envelope into a
//! list of opaque JSON records.
//!
//! # Design
//! - `NytClient` builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network (host-does-IO pattern).
//! - `NytApi` pairs a client with a `Transport` and exposes one method per
//!   endpoint. `UreqTransport` is the default transport.
//! - Validation errors are returned before any request is executed.
//!
//! ```no_run
//! use nyt_core::{MovieReviewQuery, NytApi};
//!
//! let api = NytApi::new("my-api-key")?;
//! let stories = api.top_stories(Some("science"))?;
//! let reviews = api.movie_reviews(&MovieReviewQuery::default().keyword("alien").max_results(40))?;
//! println!("{} stories, {} reviews", stories.len(), reviews.len());
//! # Ok::<(), nyt_core::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;

pub use api::NytApi;
pub use client::{MovieReviewPage, MovieReviewSearch, NytClient, Record};
pub use config::{ApiConfig, Endpoints};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use params::{BookReviewFilter, ListDate, MovieOrder, MovieReviewQuery, Period, ShareMethod};
