use chrono::NaiveDateTime;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{QueryTable, RangeLookup, ResultRecord};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;
pub const MAX_ITEMS_PER_PAGE: u32 = 100;

/// An inclusive, validated `[start, end]` window over query timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Validates a requested window against `now`; a missing end means `now`.
    pub fn resolve(
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<Self> {
        if start > now {
            return Err(AppError::StartInFuture);
        }
        let end = match end {
            Some(end) if end < start => return Err(AppError::EndBeforeStart),
            Some(end) => end,
            None => now,
        };
        Ok(Self { start, end })
    }
}

pub async fn queries_between(repository: &Repository, range: TimeRange) -> Result<RangeLookup> {
    let rows = repository.get_queries_between(range.start, range.end).await?;
    tracing::debug!(
        "Found {} queries between {} and {}",
        rows.len(),
        range.start,
        range.end
    );
    if rows.is_empty() {
        return Ok(RangeLookup::Empty);
    }
    Ok(RangeLookup::Found(QueryTable::new(rows)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    items_per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, items_per_page: u32) -> Result<Self> {
        if page < 1 {
            return Err(AppError::InvalidParameter(
                "page must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_ITEMS_PER_PAGE).contains(&items_per_page) {
            return Err(AppError::InvalidParameter(format!(
                "items_per_page must be between 1 and {MAX_ITEMS_PER_PAGE}"
            )));
        }
        Ok(Self {
            page,
            items_per_page,
        })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.items_per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.items_per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

pub async fn results_page(
    repository: &Repository,
    pagination: Pagination,
) -> Result<Vec<ResultRecord>> {
    repository
        .get_results_page(pagination.limit(), pagination.offset())
        .await
}
