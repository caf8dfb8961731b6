//! In-process stand-in for the NYT developer API.
//!
//! Mirrors the upstream URL layout under `/svc/...`, checks the `api-key`
//! query parameter, and answers with small deterministic fixtures shaped
//! like the real envelopes. The movie review search pages through a catalog
//! of `MockConfig::movie_reviews` entries, 20 at a time.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const MOVIE_PAGE_SIZE: usize = 20;
pub const CURRENT_LIST_DATE: &str = "2026-10-18";

const SECTIONS: &[&str] = &[
    "arts", "business", "home", "politics", "science", "sports", "technology", "world",
];

const LIST_NAMES: &[(&str, &str)] = &[
    ("Combined Print and E-Book Fiction", "combined-print-and-e-book-fiction"),
    ("Hardcover Fiction", "hardcover-fiction"),
    ("Hardcover Nonfiction", "hardcover-nonfiction"),
    ("Young Adult Hardcover", "young-adult-hardcover"),
];

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_key: String,
    /// Size of the movie review catalog.
    pub movie_reviews: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: "test-key".to_string(),
            movie_reviews: 45,
        }
    }
}

type Shared = Arc<MockConfig>;
type Params = Query<HashMap<String, String>>;
type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app(config: MockConfig) -> Router {
    Router::new()
        .route("/svc/topstories/v2/{file}", get(top_stories))
        .route("/svc/mostpopular/v2/viewed/{file}", get(most_viewed))
        .route("/svc/mostpopular/v2/shared/{file}", get(most_shared))
        .route("/svc/mostpopular/v2/shared/{days}/{file}", get(most_shared_by_method))
        .route("/svc/books/v3/reviews.json", get(book_reviews))
        .route("/svc/books/v3/lists/names.json", get(list_names))
        .route("/svc/books/v3/lists/{date}/{file}", get(best_sellers_list))
        .route("/svc/movies/v2/reviews/search.json", get(movie_reviews))
        .with_state(Arc::new(config))
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn fault(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "fault": { "faultstring": message } })))
}

fn authorize(
    config: &MockConfig,
    params: &HashMap<String, String>,
) -> Result<(), (StatusCode, Json<Value>)> {
    match params.get("api-key") {
        Some(key) if *key == config.api_key => Ok(()),
        _ => {
            tracing::warn!("rejected request with missing or wrong api-key");
            Err(fault(StatusCode::UNAUTHORIZED, "Invalid ApiKey"))
        }
    }
}

/// `home.json` -> `home`.
fn json_stem(file: &str) -> Result<&str, (StatusCode, Json<Value>)> {
    file.strip_suffix(".json")
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| fault(StatusCode::NOT_FOUND, "Resource not found"))
}

fn parse_days(raw: &str) -> Result<u32, (StatusCode, Json<Value>)> {
    match raw.parse::<u32>() {
        Ok(days @ (1 | 7 | 30)) => Ok(days),
        _ => Err(fault(StatusCode::BAD_REQUEST, "Invalid period")),
    }
}

fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn envelope(results: Vec<Value>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "copyright": "Copyright (c) The New York Times Company. All Rights Reserved.",
        "num_results": results.len(),
        "results": results,
    }))
}

async fn top_stories(
    State(config): State<Shared>,
    Path(file): Path<String>,
    Query(params): Params,
) -> Reply {
    authorize(&config, &params)?;
    let section = json_stem(&file)?;
    if !SECTIONS.contains(&section) {
        return Err(fault(StatusCode::NOT_FOUND, "Unknown section"));
    }
    let results = (1..=3)
        .map(|i| {
            json!({
                "section": section,
                "title": format!("{section} story {i}"),
                "url": format!("https://www.nytimes.com/{section}/{i}.html"),
            })
        })
        .collect();
    Ok(envelope(results))
}

fn popular(days: u32, share_type: Option<&str>) -> Json<Value> {
    let results = (1..=5)
        .map(|rank| {
            json!({
                "id": days * 100 + rank,
                "period": days,
                "rank": rank,
                "share_type": share_type,
                "title": format!("Popular article {rank}"),
            })
        })
        .collect();
    envelope(results)
}

async fn most_viewed(
    State(config): State<Shared>,
    Path(file): Path<String>,
    Query(params): Params,
) -> Reply {
    authorize(&config, &params)?;
    let days = parse_days(json_stem(&file)?)?;
    Ok(popular(days, None))
}

async fn most_shared(
    State(config): State<Shared>,
    Path(file): Path<String>,
    Query(params): Params,
) -> Reply {
    authorize(&config, &params)?;
    let days = parse_days(json_stem(&file)?)?;
    Ok(popular(days, Some("all")))
}

async fn most_shared_by_method(
    State(config): State<Shared>,
    Path((days, file)): Path<(String, String)>,
    Query(params): Params,
) -> Reply {
    authorize(&config, &params)?;
    let days = parse_days(&days)?;
    let method = json_stem(&file)?;
    if !["email", "facebook", "twitter"].contains(&method) {
        return Err(fault(StatusCode::NOT_FOUND, "Unknown share type"));
    }
    Ok(popular(days, Some(method)))
}

async fn book_reviews(State(config): State<Shared>, Query(params): Params) -> Reply {
    authorize(&config, &params)?;
    let filters: Vec<(&str, &String)> = ["author", "isbn", "title"]
        .into_iter()
        .filter_map(|key| params.get(key).map(|v| (key, v)))
        .collect();
    let [(key, value)] = filters.as_slice() else {
        return Err(fault(
            StatusCode::BAD_REQUEST,
            "Exactly one of author, isbn or title is required",
        ));
    };
    let review = json!({
        "matched_on": key,
        "book_author": if *key == "author" { value.as_str() } else { "Unknown Author" },
        "book_title": if *key == "title" { value.as_str() } else { "Unknown Title" },
        "isbn13": if *key == "isbn" { vec![value.as_str()] } else { Vec::new() },
        "summary": "A review.",
    });
    Ok(envelope(vec![review]))
}

async fn list_names(State(config): State<Shared>, Query(params): Params) -> Reply {
    authorize(&config, &params)?;
    let results = LIST_NAMES
        .iter()
        .map(|(display, encoded)| {
            json!({
                "list_name": display,
                "display_name": display,
                "list_name_encoded": encoded,
                "updated": "WEEKLY",
            })
        })
        .collect();
    Ok(envelope(results))
}

async fn best_sellers_list(
    State(config): State<Shared>,
    Path((date, file)): Path<(String, String)>,
    Query(params): Params,
) -> Reply {
    authorize(&config, &params)?;
    let name = json_stem(&file)?;
    if date != "current" && !is_iso_date(&date) {
        return Err(fault(StatusCode::BAD_REQUEST, "Invalid date"));
    }
    let Some((display, _)) = LIST_NAMES.iter().find(|(_, encoded)| *encoded == name) else {
        return Err(fault(StatusCode::NOT_FOUND, "Unknown list"));
    };
    let published = if date == "current" { CURRENT_LIST_DATE } else { date.as_str() };
    let books: Vec<Value> = (1..=5)
        .map(|rank| {
            json!({
                "rank": rank,
                "title": format!("{display} #{rank}"),
                "weeks_on_list": rank * 2,
            })
        })
        .collect();
    Ok(Json(json!({
        "status": "OK",
        "num_results": books.len(),
        "results": {
            "list_name": display,
            "list_name_encoded": name,
            "published_date": published,
            "books": books,
        },
    })))
}

async fn movie_reviews(State(config): State<Shared>, Query(params): Params) -> Reply {
    authorize(&config, &params)?;
    let offset = match params.get("offset").map(|o| o.parse::<usize>()) {
        None => 0,
        Some(Ok(offset)) if offset % MOVIE_PAGE_SIZE == 0 => offset,
        Some(_) => {
            return Err(fault(StatusCode::BAD_REQUEST, "offset must be a multiple of 20"));
        }
    };
    if let Some(order) = params.get("order") {
        if !["by-opening-date", "by-publication-date", "by-title"].contains(&order.as_str()) {
            return Err(fault(StatusCode::BAD_REQUEST, "Invalid order"));
        }
    }

    let end = (offset + MOVIE_PAGE_SIZE).min(config.movie_reviews);
    let page: Vec<Value> = (offset..end)
        .map(|i| {
            json!({
                "display_title": format!("Movie {i:03}"),
                "critics_pick": if params.contains_key("critics-pick") {
                    1
                } else {
                    i32::from(i % 3 == 0)
                },
                "byline": params.get("reviewer").map(String::as_str).unwrap_or("Staff"),
                "query": params.get("query"),
                "opening_date": params.get("opening-date"),
                "publication_date": params.get("publication-date"),
            })
        })
        .collect();
    let has_more = end < config.movie_reviews;
    tracing::debug!(offset, returned = page.len(), has_more, "movie reviews page");

    let results = if page.is_empty() { Value::Null } else { Value::Array(page) };
    Ok(Json(json!({
        "status": "OK",
        "has_more": has_more,
        "num_results": results.as_array().map_or(0, Vec::len),
        "results": results,
    })))
}
