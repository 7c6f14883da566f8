use chrono::NaiveDateTime;
use rusqlite::{params, ErrorCode, OptionalExtension, Row, Transaction};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{
    format_timestamp, NewQueryResult, QueryMetadata, QueryRecord, ResultRecord,
};

use super::schema::SCHEMA;

/// Storage format for `time_of_storage`; sub-second precision keeps batch order stable.
const STORAGE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Inserted,
    AlreadyStored,
}

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Query metadata operations

    /// Inserts a metadata record on its own, leaving an existing record untouched.
    pub async fn insert_query_metadata(&self, metadata: QueryMetadata) -> Result<WriteStatus> {
        let status = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    r#"INSERT INTO query_metadata (id, query, num_results, max_results, status, timestamp)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                       ON CONFLICT(id) DO NOTHING"#,
                    params![
                        metadata.id,
                        metadata.query,
                        metadata.num_results,
                        metadata.max_results,
                        metadata.status,
                        format_timestamp(&metadata.timestamp),
                    ],
                )?;
                Ok(if changed == 0 {
                    WriteStatus::AlreadyStored
                } else {
                    WriteStatus::Inserted
                })
            })
            .await?;
        Ok(status)
    }

    /// Writes a metadata record and all of its result rows in one transaction.
    ///
    /// A primary-key collision on the metadata id rolls the transaction back and
    /// reports `AlreadyStored`, so a concurrent writer of the same id never
    /// produces a second set of rows.
    pub async fn store_query_with_results(
        &self,
        metadata: QueryMetadata,
        results: Vec<NewQueryResult>,
    ) -> Result<WriteStatus> {
        let status = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                match insert_metadata_strict(&tx, &metadata) {
                    Ok(()) => {}
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        return Ok(WriteStatus::AlreadyStored);
                    }
                    Err(e) => return Err(e.into()),
                }

                {
                    let mut stmt = tx.prepare(
                        r#"INSERT INTO query_results (query_id, author, title, journal, time_of_storage)
                           VALUES (?1, ?2, ?3, ?4, ?5)"#,
                    )?;
                    for result in &results {
                        stmt.execute(params![
                            result.query_id,
                            result.author,
                            result.title,
                            result.journal,
                            result.time_of_storage.format(STORAGE_TIME_FORMAT).to_string(),
                        ])?;
                    }
                }

                tx.commit()?;
                Ok(WriteStatus::Inserted)
            })
            .await?;
        Ok(status)
    }

    pub async fn get_query_metadata(&self, query_id: &str) -> Result<Option<QueryMetadata>> {
        let query_id = query_id.to_string();
        let metadata = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, query, num_results, max_results, status, timestamp FROM query_metadata WHERE id = ?1",
                )?;
                let metadata = stmt
                    .query_row(params![query_id], metadata_from_row)
                    .optional()?;
                Ok(metadata)
            })
            .await?;
        Ok(metadata)
    }

    pub async fn query_id_exists(&self, query_id: &str) -> Result<bool> {
        let query_id = query_id.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM query_metadata WHERE id = ?1",
                    params![query_id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    /// Metadata with `start <= timestamp <= end`, in insertion order.
    pub async fn get_queries_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<QueryRecord>> {
        let start = format_timestamp(&start);
        let end = format_timestamp(&end);
        let records = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT query, timestamp, status, num_results
                       FROM query_metadata
                       WHERE timestamp >= ?1 AND timestamp <= ?2
                       ORDER BY rowid"#,
                )?;
                let records = stmt
                    .query_map(params![start, end], query_record_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await?;
        Ok(records)
    }

    // Query result operations

    /// One window of result rows, oldest stored first.
    pub async fn get_results_page(&self, limit: i64, offset: i64) -> Result<Vec<ResultRecord>> {
        let records = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT author, title, journal
                       FROM query_results
                       ORDER BY time_of_storage ASC, id ASC
                       LIMIT ?1 OFFSET ?2"#,
                )?;
                let records = stmt
                    .query_map(params![limit, offset], |row| {
                        Ok(ResultRecord {
                            author: row.get(0)?,
                            title: row.get(1)?,
                            journal: row.get(2)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await?;
        Ok(records)
    }

    pub async fn count_results(&self, query_id: Option<&str>) -> Result<i64> {
        let query_id = query_id.map(str::to_string);
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 = match query_id {
                    Some(id) => conn.query_row(
                        "SELECT COUNT(*) FROM query_results WHERE query_id = ?1",
                        params![id],
                        |row| row.get(0),
                    )?,
                    None => {
                        conn.query_row("SELECT COUNT(*) FROM query_results", [], |row| row.get(0))?
                    }
                };
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}

fn insert_metadata_strict(tx: &Transaction<'_>, metadata: &QueryMetadata) -> rusqlite::Result<()> {
    tx.execute(
        r#"INSERT INTO query_metadata (id, query, num_results, max_results, status, timestamp)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        params![
            metadata.id,
            metadata.query,
            metadata.num_results,
            metadata.max_results,
            metadata.status,
            format_timestamp(&metadata.timestamp),
        ],
    )?;
    Ok(())
}

fn parse_stored_timestamp(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    crate::models::parse_timestamp(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn metadata_from_row(row: &Row) -> rusqlite::Result<QueryMetadata> {
    let timestamp: String = row.get(5)?;
    Ok(QueryMetadata {
        id: row.get(0)?,
        query: row.get(1)?,
        num_results: row.get(2)?,
        max_results: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        status: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        timestamp: parse_stored_timestamp(5, &timestamp)?,
    })
}

fn query_record_from_row(row: &Row) -> rusqlite::Result<QueryRecord> {
    let timestamp: String = row.get(1)?;
    Ok(QueryRecord {
        query: row.get(0)?,
        timestamp: parse_stored_timestamp(1, &timestamp)?,
        status: row.get(2)?,
        num_results: row.get(3)?,
    })
}
