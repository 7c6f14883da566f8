//! Shared harness for the HTTP integration tests.
//!
//! `TestApp` runs the real router on a random local port with a temporary
//! SQLite file, and points the arXiv client at a `wiremock` server.

#![allow(unused)]

use std::path::PathBuf;

use anyhow::Result;
use arxiv_store::{config::Config, server::create_router, App};
use reqwest::Client;
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CAPSULES_FEED: &str = include_str!("../fixtures/capsules.xml");
pub const EMPTY_FEED: &str = include_str!("../fixtures/empty.xml");

/// `Date` header sent with every mocked arXiv response.
pub const ARXIV_DATE: &str = "Tue, 01 Jun 2021 19:56:14 GMT";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub arxiv: MockServer,
    pub app: App,
    pub db_path: PathBuf,
    _data_dir: TempDir,
    _server: JoinHandle<()>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let arxiv = MockServer::start().await;
        let data_dir = tempfile::tempdir()?;
        let db_path = data_dir.path().join("arxiv.db");

        let config = Config {
            db_path: db_path.to_string_lossy().to_string(),
            arxiv_api_url: format!("{}/api/query", arxiv.uri()),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            ..Config::default()
        };
        let app = App::new(&config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);
        let router = create_router(app.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self {
            address,
            client: Client::new(),
            arxiv,
            app,
            db_path,
            _data_dir: data_dir,
            _server: server,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Answers searches for `search_query` with `body` and the given status.
    pub async fn mock_search(&self, search_query: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", search_query))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("Date", ARXIV_DATE)
                    .insert_header("Content-Type", "application/atom+xml")
                    .set_body_string(body),
            )
            .mount(&self.arxiv)
            .await;
    }

    pub async fn arxiv_requests(&self) -> usize {
        self.arxiv
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
