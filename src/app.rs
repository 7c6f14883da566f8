use chrono::NaiveDateTime;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::feed::ArxivClient;
use crate::models::{now_timestamp, IngestOutcome, RangeLookup, ResultRecord};
use crate::services::{self, Pagination, SearchRequest, TimeRange};

/// Shared services handed to every request.
///
/// Built once at startup and cloned into the router; both members are
/// handles, so clones share the same connection and HTTP client.
#[derive(Clone)]
pub struct App {
    pub repository: Repository,
    pub arxiv: ArxivClient,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let arxiv = ArxivClient::new(config)?;

        Ok(Self::from_parts(repository, arxiv))
    }

    pub fn from_parts(repository: Repository, arxiv: ArxivClient) -> Self {
        Self { repository, arxiv }
    }

    pub async fn ingest(&self, request: &SearchRequest) -> Result<IngestOutcome> {
        services::ingest(&self.arxiv, &self.repository, request).await
    }

    pub async fn queries_between(
        &self,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<RangeLookup> {
        let range = TimeRange::resolve(start, end, now_timestamp())?;
        services::queries_between(&self.repository, range).await
    }

    pub async fn results_page(&self, pagination: Pagination) -> Result<Vec<ResultRecord>> {
        services::results_page(&self.repository, pagination).await
    }
}
