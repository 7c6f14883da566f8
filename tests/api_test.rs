mod common;

use anyhow::Result;
use arxiv_store::models::{parse_timestamp, NewQueryResult, QueryMetadata};
use chrono::Duration;
use common::{TestApp, CAPSULES_FEED, EMPTY_FEED};
use reqwest::StatusCode;
use serde_json::Value;

async fn error_of(response: reqwest::Response) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let body: Value = response.json().await?;
    Ok((status, body["error"].as_str().unwrap_or_default().to_string()))
}

#[tokio::test]
async fn health_endpoints_respond() -> Result<()> {
    let app = TestApp::spawn().await?;

    let root = app.client.get(app.url("/")).send().await?;
    assert_eq!(root.status(), StatusCode::OK);

    let health = app.client.get(app.url("/health")).send().await?;
    assert_eq!(health.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn search_is_stored_once_then_reported_as_existing() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_search("au:hinton", 200, CAPSULES_FEED).await;

    let first = app
        .client
        .get(app.url("/arxiv/?author=hinton"))
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = first.json().await?;
    assert_eq!(
        body["message"],
        "Query from arXiv API successful and stored in the database"
    );

    let second = app
        .client
        .get(app.url("/arxiv/?author=hinton"))
        .send()
        .await?;
    let (status, message) = error_of(second).await?;
    assert_eq!(status, 424);
    assert_eq!(
        message,
        "Query already exists. Please retrieve it from the database"
    );

    assert_eq!(app.app.repository.count_results(None).await?, 2);
    Ok(())
}

#[tokio::test]
async fn stored_rows_carry_authors_and_journal() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_search("au:hinton", 200, CAPSULES_FEED).await;
    app.client
        .get(app.url("/arxiv/?author=hinton"))
        .send()
        .await?;

    let body: Value = app
        .client
        .get(app.url("/results/"))
        .send()
        .await?
        .json()
        .await?;
    let rows = body["result"].as_array().cloned().unwrap_or_default();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0]["author"],
        "Sara Sabour, Nicholas Frosst, Geoffrey E Hinton"
    );
    assert_eq!(rows[0]["title"], "Dynamic Routing Between Capsules");
    assert!(rows[0]["journal"].is_null());
    assert_eq!(rows[1]["title"], "Distilling the Knowledge in a Neural Network");
    assert_eq!(rows[1]["journal"], "NIPS 2014 Deep Learning Workshop");
    Ok(())
}

#[tokio::test]
async fn search_without_fields_never_reaches_arxiv() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .get(app.url("/arxiv/?author=&title=%20"))
        .send()
        .await?;
    let (status, message) = error_of(response).await?;

    assert_eq!(status, 420);
    assert_eq!(
        message,
        "At least one of author, title, or journal must be provided."
    );
    assert_eq!(app.arxiv_requests().await, 0);
    Ok(())
}

#[tokio::test]
async fn failing_arxiv_is_421_and_stores_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_search("ti:capsules", 503, "").await;

    let response = app
        .client
        .get(app.url("/arxiv/?title=capsules"))
        .send()
        .await?;
    let (status, _) = error_of(response).await?;

    assert_eq!(status, 421);
    assert_eq!(app.app.repository.count_results(None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn failed_write_is_423_and_leaves_no_metadata() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_search("au:hinton", 200, CAPSULES_FEED).await;
    rusqlite::Connection::open(&app.db_path)?.execute_batch("DROP TABLE query_results")?;

    let response = app
        .client
        .get(app.url("/arxiv/?author=hinton"))
        .send()
        .await?;
    let (status, message) = error_of(response).await?;

    assert_eq!(status, 423);
    assert_eq!(message, "Failed to store query and results in the database");
    assert!(
        !app.app
            .repository
            .query_id_exists("7dyUvxV0ALvrbxJ5PtLXMMHRvH4")
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn empty_search_is_422_but_metadata_is_kept() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_search("ti:unobtainium", 200, EMPTY_FEED).await;

    let response = app
        .client
        .get(app.url("/arxiv/?title=unobtainium"))
        .send()
        .await?;
    let (status, _) = error_of(response).await?;

    assert_eq!(status, 422);
    let stored = app
        .app
        .repository
        .get_query_metadata("Qm2cE8J0wLrNq1mP5bTz0YbVd3s")
        .await?
        .expect("metadata for the empty search");
    assert_eq!(stored.num_results, Some(0));
    assert_eq!(app.app.repository.count_results(None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn bad_max_query_results_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    for query in ["max_query_results=0", "max_query_results=many"] {
        let response = app
            .client
            .get(app.url(&format!("/arxiv/?author=hinton&{query}")))
            .send()
            .await?;
        let (status, message) = error_of(response).await?;
        assert_eq!(status, 400, "{query}");
        assert!(message.contains("max_query_results"), "{message}");
    }
    assert_eq!(app.arxiv_requests().await, 0);
    Ok(())
}

#[tokio::test]
async fn stored_query_is_listed_as_json_and_pdf() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_search("au:hinton", 200, CAPSULES_FEED).await;
    app.client
        .get(app.url("/arxiv/?author=hinton"))
        .send()
        .await?;
    let range = "query_timestamp_start=2021-06-01T00:00:00&query_timestamp_end=2021-06-02T00:00:00";

    let listing: Value = app
        .client
        .post(app.url(&format!("/queries/?{range}")))
        .send()
        .await?
        .json()
        .await?;
    let records = listing.as_array().cloned().unwrap_or_default();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["timestamp"], "2021-06-01T19:56:14");
    assert_eq!(records[0]["status"], 200);
    assert_eq!(records[0]["num_results"], 2);
    assert!(records[0]["query"]
        .as_str()
        .unwrap_or_default()
        .starts_with("ArXiv Query: search_query=au:hinton"));

    let pdf = app
        .client
        .get(app.url(&format!("/queries/?{range}")))
        .send()
        .await?;
    assert_eq!(pdf.status(), StatusCode::OK);
    assert_eq!(pdf.headers()["content-type"], "application/pdf");
    assert_eq!(
        pdf.headers()["content-disposition"],
        "attachment; filename=queries.pdf"
    );
    assert!(pdf.bytes().await?.starts_with(b"%PDF"));
    Ok(())
}

#[tokio::test]
async fn time_range_errors_use_their_codes() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        ("query_timestamp_start=yesterday", 427),
        ("query_timestamp_start=2021-06-01", 427),
        ("", 427),
        ("query_timestamp_start=2999-01-01T00:00:00", 425),
        (
            "query_timestamp_start=2021-06-02T00:00:00&query_timestamp_end=2021-06-01T00:00:00",
            426,
        ),
        (
            "query_timestamp_start=2021-06-01T00:00:00&query_timestamp_end=2021-06-01T00:00:00",
            428,
        ),
    ];

    for (query, expected) in cases {
        let response = app
            .client
            .post(app.url(&format!("/queries/?{query}")))
            .send()
            .await?;
        let (status, _) = error_of(response).await?;
        assert_eq!(status, expected, "{query}");
    }
    Ok(())
}

#[tokio::test]
async fn results_are_paginated_in_storage_order() -> Result<()> {
    let app = TestApp::spawn().await?;
    let stored_at = parse_timestamp("2024-04-10T09:00:00")?;
    let metadata = QueryMetadata {
        id: "pagination".to_string(),
        query: "ArXiv Query: search_query=ti:graphs".to_string(),
        num_results: Some(11),
        max_results: 11,
        status: 200,
        timestamp: stored_at,
    };
    let rows = (1..=11)
        .map(|n| NewQueryResult {
            query_id: "pagination".to_string(),
            author: Some(format!("Author {n}")),
            title: format!("Paper {n}"),
            journal: None,
            time_of_storage: stored_at + Duration::seconds(n),
        })
        .collect();
    app.app
        .repository
        .store_query_with_results(metadata, rows)
        .await?;

    let first: Value = app
        .client
        .get(app.url("/results/?page=1&items_per_page=10"))
        .send()
        .await?
        .json()
        .await?;
    let second: Value = app
        .client
        .get(app.url("/results/?page=2&items_per_page=10"))
        .send()
        .await?
        .json()
        .await?;

    let first = first["result"].as_array().cloned().unwrap_or_default();
    let second = second["result"].as_array().cloned().unwrap_or_default();
    assert_eq!(first.len(), 10);
    assert_eq!(first[0]["title"], "Paper 1");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["title"], "Paper 11");
    Ok(())
}

#[tokio::test]
async fn invalid_pagination_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    for query in ["items_per_page=101", "items_per_page=0", "page=0", "page=two"] {
        let response = app
            .client
            .get(app.url(&format!("/results/?{query}")))
            .send()
            .await?;
        let (status, _) = error_of(response).await?;
        assert_eq!(status, 400, "{query}");
    }
    Ok(())
}
