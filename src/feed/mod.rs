mod fetcher;
mod parser;
mod query;

pub use fetcher::{ArxivClient, ArxivResponse};
pub use parser::{parse_response, ParsedQuery};
pub use query::SearchQuery;
