pub mod ingest;
pub mod retrieval;

pub use ingest::{ingest, SearchRequest, DEFAULT_MAX_RESULTS};
pub use retrieval::{queries_between, results_page, Pagination, TimeRange};
