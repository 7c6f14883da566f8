use std::time::Duration;

use reqwest::header::DATE;
use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};

use super::query::SearchQuery;

/// Raw pieces of an arXiv API response that the parser needs.
#[derive(Debug, Clone)]
pub struct ArxivResponse {
    pub status: u16,
    pub date: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
pub struct ArxivClient {
    client: Client,
    api_url: Url,
}

impl ArxivClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        let api_url = Url::parse(&config.arxiv_api_url)?;

        Ok(Self { client, api_url })
    }

    pub fn search_url(&self, query: &SearchQuery, max_results: u32) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("search_query", query.as_str())
            .append_pair("start", "0")
            .append_pair("max_results", &max_results.to_string())
            .append_pair("sortBy", "relevance")
            .append_pair("sortOrder", "descending");
        url
    }

    /// Runs one search against the API.
    ///
    /// Transport errors, timeouts and non-success statuses all surface as
    /// `ArxivUnavailable`; nothing is retried.
    pub async fn fetch(&self, query: &SearchQuery, max_results: u32) -> Result<ArxivResponse> {
        let url = self.search_url(query, max_results);
        tracing::debug!("Querying arXiv: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ArxivUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ArxivUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let status = response.status().as_u16();
        let date = response
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::ArxivUnavailable(e.to_string()))?;

        tracing::debug!("arXiv answered {} with {} bytes", status, body.len());

        Ok(ArxivResponse {
            status,
            date,
            body: body.to_vec(),
        })
    }
}
