use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Timelike};
use feed_rs::parser;
use quick_xml::escape::unescape;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{now_timestamp, NewQueryResult, QueryMetadata};

use super::fetcher::ArxivResponse;

static TOTAL_RESULTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<opensearch:totalResults[^>]*>\s*(\d+)\s*</opensearch:totalResults>")
        .expect("totalResults pattern")
});
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry\b.*?</entry>").expect("entry pattern"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<id>\s*(.*?)\s*</id>").expect("id pattern"));
static JOURNAL_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<arxiv:journal_ref[^>]*>(.*?)</arxiv:journal_ref>")
        .expect("journal_ref pattern")
});
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("CDATA pattern"));

/// Metadata plus result rows derived from one arXiv response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub metadata: QueryMetadata,
    pub results: Vec<NewQueryResult>,
}

/// Turns an arXiv Atom response into storable records.
///
/// feed-rs covers the Atom core (ids, titles, authors). The OpenSearch
/// `totalResults` count and the per-entry `arxiv:journal_ref` live in
/// extension namespaces feed-rs does not expose, so those are read from the
/// raw document.
pub fn parse_response(
    response: &ArxivResponse,
    max_results: u32,
    stored_at: NaiveDateTime,
) -> Result<ParsedQuery> {
    let feed = parser::parse(&response.body[..])?;
    let raw = String::from_utf8_lossy(&response.body);

    let id = feed
        .id
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    if id.is_empty() {
        return Err(AppError::Other(anyhow::anyhow!("arXiv feed has no id")));
    }

    let num_results = match total_results(&raw) {
        Some(n) => n,
        None => {
            tracing::warn!("arXiv feed {} has no totalResults, using entry count", id);
            i64::try_from(feed.entries.len()).unwrap_or(i64::MAX)
        }
    };

    let metadata = QueryMetadata {
        id: id.clone(),
        query: feed.title.map(|t| t.content).unwrap_or_default(),
        num_results: Some(num_results),
        max_results: i64::from(max_results),
        status: i64::from(response.status),
        timestamp: response_timestamp(response.date.as_deref()),
    };

    if metadata.has_no_results() {
        return Ok(ParsedQuery {
            metadata,
            results: Vec::new(),
        });
    }

    let journals = journal_refs(&raw)?;
    let results = feed
        .entries
        .into_iter()
        .map(|entry| {
            let authors: Vec<String> = entry
                .authors
                .iter()
                .map(|a| a.name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();

            NewQueryResult {
                query_id: id.clone(),
                author: (!authors.is_empty()).then(|| authors.join(", ")),
                title: entry
                    .title
                    .map(|t| collapse_whitespace(&t.content))
                    .unwrap_or_else(|| "Untitled".to_string()),
                journal: journals.get(entry.id.trim()).cloned(),
                time_of_storage: stored_at,
            }
        })
        .collect();

    Ok(ParsedQuery { metadata, results })
}

/// RFC 1123 `Date` header to a UTC timestamp, falling back to the current time.
fn response_timestamp(date: Option<&str>) -> NaiveDateTime {
    match date.map(DateTime::parse_from_rfc2822) {
        Some(Ok(dt)) => {
            let utc = dt.naive_utc();
            utc.with_nanosecond(0).unwrap_or(utc)
        }
        Some(Err(e)) => {
            tracing::warn!("Unparsable Date header from arXiv: {}", e);
            now_timestamp()
        }
        None => now_timestamp(),
    }
}

fn total_results(raw: &str) -> Option<i64> {
    TOTAL_RESULTS_RE
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Maps entry id to its journal reference, for entries that have one.
fn journal_refs(raw: &str) -> Result<HashMap<String, String>> {
    let mut refs = HashMap::new();
    for entry in ENTRY_RE.find_iter(raw) {
        let block = entry.as_str();
        let (Some(id), Some(journal)) = (
            ID_RE.captures(block).and_then(|cap| cap.get(1)),
            JOURNAL_REF_RE.captures(block).and_then(|cap| cap.get(1)),
        ) else {
            continue;
        };

        let journal = collapse_whitespace(&decode_text(journal.as_str())?);
        if !journal.is_empty() {
            refs.insert(decode_text(id.as_str())?.trim().to_string(), journal);
        }
    }
    Ok(refs)
}

/// Character data of an element: CDATA sections are taken verbatim, the rest
/// has its entity and character references resolved.
fn decode_text(raw: &str) -> Result<String> {
    let mut text = String::with_capacity(raw.len());
    let mut last = 0;
    for cap in CDATA_RE.captures_iter(raw) {
        let (Some(section), Some(content)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        text.push_str(&unescape(&raw[last..section.start()])?);
        text.push_str(content.as_str());
        last = section.end();
    }
    text.push_str(&unescape(&raw[last..])?);
    Ok(text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
