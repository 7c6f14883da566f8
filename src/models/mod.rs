mod query;
mod timestamp;

pub use query::{
    IngestOutcome, NewQueryResult, QueryMetadata, QueryRecord, QueryTable, RangeLookup,
    ResultRecord, QUERY_COLUMNS,
};
pub use timestamp::{format_timestamp, now_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
