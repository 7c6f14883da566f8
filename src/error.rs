use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("At least one of author, title, or journal must be provided")]
    NoSearchParameters,

    #[error("arXiv API unavailable: {0}")]
    ArxivUnavailable(String),

    #[error("Failed to store query: {0}")]
    StorageFailure(String),

    #[error("Query start timestamp is in the future")]
    StartInFuture,

    #[error("Query end timestamp is before the start timestamp")]
    EndBeforeStart,

    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
