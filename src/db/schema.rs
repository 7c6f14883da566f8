pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- query_metadata table
CREATE TABLE IF NOT EXISTS query_metadata (
    id TEXT PRIMARY KEY,
    query TEXT NOT NULL,
    num_results INTEGER,
    max_results INTEGER,
    status INTEGER,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_query_metadata_timestamp ON query_metadata(timestamp);

-- query_results table
CREATE TABLE IF NOT EXISTS query_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query_id TEXT NOT NULL REFERENCES query_metadata(id),
    author TEXT,
    title TEXT NOT NULL,
    journal TEXT,
    time_of_storage TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_query_results_query_id ON query_results(query_id);
CREATE INDEX IF NOT EXISTS idx_query_results_time_of_storage ON query_results(time_of_storage);
"#;
