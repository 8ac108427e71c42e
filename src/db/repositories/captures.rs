use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::params;

use crate::db::{connection::Database, helpers::parse_store_datetime, models::CaptureRecord};

const SECONDS_PER_DAY: f64 = 86_400.0;

impl Database {
    /// Fetches capture rows whose frame timestamp falls within the last
    /// `interval_seconds`, newest first.
    ///
    /// Rows with a future timestamp (negative elapsed time, clock skew) are
    /// excluded by the query itself. Rows whose timestamp cannot be parsed
    /// are skipped with a warning; the store is append-only external data.
    pub async fn fetch_recent_captures(
        &self,
        interval_seconds: u32,
    ) -> Result<Vec<CaptureRecord>> {
        self.execute(move |conn| {
            let max_diff_days = f64::from(interval_seconds) / SECONDS_PER_DAY;
            let started = Instant::now();

            let mut stmt = conn.prepare(
                "SELECT
                    at.frameId AS frame_id,
                    at.text AS full_text,
                    at.lid AS langid,
                    f.timestamp AS frame_timestamp
                 FROM allText at
                 JOIN frames f ON at.frameId = f.id
                 WHERE julianday('now') - julianday(f.timestamp) <= ?1
                   AND julianday('now') - julianday(f.timestamp) >= 0
                 ORDER BY f.timestamp DESC",
            )?;

            let mut rows = stmt.query(params![max_diff_days])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let frame_id: i64 = row.get(0)?;
                let text: Option<String> = row.get(1)?;
                let language_id: Option<String> = row.get(2)?;
                let timestamp_raw: String = row.get(3)?;

                let timestamp = match parse_store_datetime(&timestamp_raw) {
                    Ok(timestamp) => timestamp,
                    Err(err) => {
                        warn!("Skipping frame {frame_id} with unreadable timestamp: {err}");
                        continue;
                    }
                };

                records.push(CaptureRecord {
                    frame_id,
                    timestamp,
                    text: text.unwrap_or_default(),
                    language_id: language_id.unwrap_or_default(),
                });
            }

            info!(
                "Capture store query for the last {interval_seconds}s returned {} rows in {}ms",
                records.len(),
                started.elapsed().as_millis()
            );

            Ok(records)
        })
        .await
        .with_context(|| {
            format!("failed to read captures from the last {interval_seconds} seconds")
        })
    }
}
