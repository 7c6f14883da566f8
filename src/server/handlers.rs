use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::errors::ApiError;
use crate::app::App;
use crate::models::{parse_timestamp, IngestOutcome, QueryRecord, QueryTable, RangeLookup};
use crate::report;
use crate::services::retrieval::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE};
use crate::services::{Pagination, SearchRequest, DEFAULT_MAX_RESULTS};

const STORED_MESSAGE: &str = "Query from arXiv API successful and stored in the database";

// Numeric parameters arrive as strings so a bad value gets a JSON error body
// instead of the extractor's plain-text rejection.

#[derive(Debug, Deserialize)]
pub struct ArxivParams {
    pub author: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub max_query_results: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub query_timestamp_start: Option<String>,
    pub query_timestamp_end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub items_per_page: Option<String>,
}

fn parse_number(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("{name} must be a non-negative integer"))),
    }
}

pub async fn root() -> &'static str {
    "arxiv-store server is running."
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// `GET /arxiv/`: search arXiv and store what comes back.
pub async fn search_arxiv(
    State(app): State<App>,
    Query(params): Query<ArxivParams>,
) -> Result<Json<Value>, ApiError> {
    let max_results = parse_number(
        "max_query_results",
        params.max_query_results.as_deref(),
        DEFAULT_MAX_RESULTS,
    )?;
    let request = SearchRequest {
        author: params.author,
        title: params.title,
        journal: params.journal,
        max_results,
    };

    match app.ingest(&request).await? {
        IngestOutcome::Stored { query_id, results } => {
            info!("Query {} stored with {} results", query_id, results);
            Ok(Json(json!({ "message": STORED_MESSAGE })))
        }
        IngestOutcome::NoResults { .. } => Err(ApiError::NoResults),
        IngestOutcome::Duplicate { .. } => Err(ApiError::Duplicate),
    }
}

async fn lookup_range(app: &App, params: &RangeParams) -> Result<QueryTable, ApiError> {
    let start = params
        .query_timestamp_start
        .as_deref()
        .ok_or(ApiError::MalformedTimestamp)
        .and_then(|raw| parse_timestamp(raw).map_err(ApiError::from))?;
    let end = params
        .query_timestamp_end
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_timestamp)
        .transpose()?;

    match app.queries_between(start, end).await? {
        RangeLookup::Found(table) => Ok(table),
        RangeLookup::Empty => Err(ApiError::NoQueriesInRange),
    }
}

/// `GET /queries/`: the time-range listing as a PDF download.
pub async fn queries_report(
    State(app): State<App>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let table = lookup_range(&app, &params).await?;
    let pdf = report::queries_pdf(&table)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=queries.pdf",
            ),
        ],
        pdf,
    ))
}

/// `POST /queries/`: the time-range listing as JSON records.
pub async fn queries_json(
    State(app): State<App>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<QueryRecord>>, ApiError> {
    let table = lookup_range(&app, &params).await?;
    Ok(Json(table.rows))
}

/// `GET /results/`: stored paper rows, oldest first, one page at a time.
pub async fn results(
    State(app): State<App>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let page = parse_number("page", params.page.as_deref(), DEFAULT_PAGE)?;
    let items_per_page = parse_number(
        "items_per_page",
        params.items_per_page.as_deref(),
        DEFAULT_ITEMS_PER_PAGE,
    )?;
    let pagination = Pagination::new(page, items_per_page)?;

    let rows = app.results_page(pagination).await?;
    Ok(Json(json!({ "result": rows })))
}
