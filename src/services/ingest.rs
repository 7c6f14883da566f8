use chrono::Utc;

use crate::db::{Repository, WriteStatus};
use crate::error::{AppError, Result};
use crate::feed::{parse_response, ArxivClient, SearchQuery};
use crate::models::IngestOutcome;

pub const DEFAULT_MAX_RESULTS: u32 = 8;

/// Caller-supplied search fields; at least one of the three must be present.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub author: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub max_results: u32,
}

impl SearchRequest {
    pub fn query(&self) -> Result<SearchQuery> {
        SearchQuery::compose(
            self.author.as_deref(),
            self.title.as_deref(),
            self.journal.as_deref(),
        )
    }
}

/// Searches arXiv and records the outcome.
///
/// Decision order: a zero-result search stores its metadata alone; a query id
/// that is already stored is left untouched; anything else stores metadata and
/// rows together in one transaction.
pub async fn ingest(
    arxiv: &ArxivClient,
    repository: &Repository,
    request: &SearchRequest,
) -> Result<IngestOutcome> {
    let query = request.query()?;
    if request.max_results == 0 {
        return Err(AppError::InvalidParameter(
            "max_query_results must be at least 1".to_string(),
        ));
    }

    let response = arxiv.fetch(&query, request.max_results).await?;
    let parsed = parse_response(&response, request.max_results, Utc::now().naive_utc())?;
    let query_id = parsed.metadata.id.clone();

    if parsed.metadata.has_no_results() {
        repository
            .insert_query_metadata(parsed.metadata)
            .await
            .map_err(storage_failure)?;
        tracing::info!("arXiv query {} ({}) returned no results", query_id, query);
        return Ok(IngestOutcome::NoResults { query_id });
    }

    if repository.query_id_exists(&query_id).await? {
        tracing::info!("arXiv query {} already stored, skipping", query_id);
        return Ok(IngestOutcome::Duplicate { query_id });
    }

    let results = parsed.results.len();
    let status = repository
        .store_query_with_results(parsed.metadata, parsed.results)
        .await
        .map_err(storage_failure)?;

    match status {
        WriteStatus::Inserted => {
            tracing::info!("Stored arXiv query {} with {} results", query_id, results);
            Ok(IngestOutcome::Stored { query_id, results })
        }
        WriteStatus::AlreadyStored => {
            tracing::info!("arXiv query {} was stored concurrently, skipping", query_id);
            Ok(IngestOutcome::Duplicate { query_id })
        }
    }
}

fn storage_failure(err: AppError) -> AppError {
    tracing::error!("Failed to store query and results: {}", err);
    AppError::StorageFailure(err.to_string())
}
