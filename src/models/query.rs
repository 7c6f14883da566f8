use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column order of the time-range listing, shared by the JSON and PDF outputs.
pub const QUERY_COLUMNS: [&str; 4] = ["query", "timestamp", "status", "num_results"];

/// Metadata describing one search made against the arXiv API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMetadata {
    pub id: String,
    pub query: String,
    pub num_results: Option<i64>,
    pub max_results: i64,
    pub status: i64,
    pub timestamp: NaiveDateTime,
}

impl QueryMetadata {
    pub fn has_no_results(&self) -> bool {
        self.num_results == Some(0)
    }
}

/// One paper returned by a search, linked to its query by `query_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueryResult {
    pub query_id: String,
    pub author: Option<String>,
    pub title: String,
    pub journal: Option<String>,
    pub time_of_storage: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    #[serde(with = "super::timestamp")]
    pub timestamp: NaiveDateTime,
    pub status: Option<i64>,
    pub num_results: Option<i64>,
}

impl QueryRecord {
    /// Cell text in `QUERY_COLUMNS` order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.query.clone(),
            super::format_timestamp(&self.timestamp),
            self.status.map(|s| s.to_string()).unwrap_or_default(),
            self.num_results.map(|n| n.to_string()).unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub author: Option<String>,
    pub title: String,
    pub journal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<QueryRecord>,
}

impl QueryTable {
    pub fn new(rows: Vec<QueryRecord>) -> Self {
        Self {
            columns: QUERY_COLUMNS.to_vec(),
            rows,
        }
    }

    pub fn cell_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(QueryRecord::cells).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeLookup {
    Empty,
    Found(QueryTable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored { query_id: String, results: usize },
    NoResults { query_id: String },
    Duplicate { query_id: String },
}

impl IngestOutcome {
    pub fn query_id(&self) -> &str {
        match self {
            IngestOutcome::Stored { query_id, .. }
            | IngestOutcome::NoResults { query_id }
            | IngestOutcome::Duplicate { query_id } => query_id,
        }
    }
}
