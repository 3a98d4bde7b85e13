//! SQLite report
//!
//! Every invocation appends one row to `runs` plus its results, so a single
//! database can hold the history of many runs against the same target list.

use crate::output::traits::{selected, OutputResult, ReportWriter};
use crate::probe::{ProbeResult, RunSummary};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// SQL schema for the report database
pub const SCHEMA_SQL: &str = r#"
-- One row per invocation
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    total INTEGER NOT NULL,
    alive INTEGER NOT NULL,
    dead INTEGER NOT NULL,
    screenshots INTEGER NOT NULL,
    elapsed_ms INTEGER NOT NULL
);

-- One row per probed domain
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    domain TEXT NOT NULL,
    alive INTEGER NOT NULL,
    status INTEGER NOT NULL,
    status_text TEXT NOT NULL,
    response_time_ms INTEGER NOT NULL,
    final_url TEXT,
    page_type TEXT,
    title TEXT,
    message TEXT NOT NULL,
    screenshot TEXT
);

CREATE INDEX IF NOT EXISTS idx_results_run ON results(run_id);
CREATE INDEX IF NOT EXISTS idx_results_domain ON results(domain);

-- Per-run page type tally
CREATE TABLE IF NOT EXISTS page_types (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    page_type TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (run_id, page_type)
);
"#;

/// Initializes the report schema
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

pub struct SqliteReport {
    path: PathBuf,
    only_alive: bool,
    config_hash: String,
}

impl SqliteReport {
    /// Creates a writer that records the given configuration hash with the run
    pub fn new(path: impl Into<PathBuf>, only_alive: bool, config_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            only_alive,
            config_hash: config_hash.into(),
        }
    }
}

impl ReportWriter for SqliteReport {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write(&self, results: &[ProbeResult], summary: &RunSummary) -> OutputResult<()> {
        let mut conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;

        let run_id = record_run(
            &mut conn,
            &self.config_hash,
            selected(results, self.only_alive),
            summary,
        )?;
        tracing::debug!("Recorded run {} in {}", run_id, self.path.display());

        Ok(())
    }
}

/// Inserts a run with its results in one transaction, returning the run ID
pub fn record_run<'a>(
    conn: &mut Connection,
    config_hash: &str,
    results: impl Iterator<Item = &'a ProbeResult>,
    summary: &RunSummary,
) -> rusqlite::Result<i64> {
    let finished: DateTime<Utc> = Utc::now();
    let started = chrono::Duration::from_std(summary.elapsed)
        .map(|elapsed| finished - elapsed)
        .unwrap_or(finished);

    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO runs (started_at, finished_at, config_hash, total, alive, dead, screenshots, elapsed_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            started.to_rfc3339(),
            finished.to_rfc3339(),
            config_hash,
            summary.total as i64,
            summary.alive as i64,
            summary.dead as i64,
            summary.screenshots as i64,
            summary.elapsed.as_millis() as i64,
        ],
    )?;
    let run_id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "INSERT INTO results (run_id, domain, alive, status, status_text, response_time_ms,
                                  final_url, page_type, title, message, screenshot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;

        for result in results {
            let page_type = result.page_info.as_ref().map(|i| i.page_type.as_str());
            let title = result.page_info.as_ref().map(|i| i.title.as_str());
            let screenshot = result.screenshot.as_ref().map(|p| p.display().to_string());

            stmt.execute(params![
                run_id,
                result.domain,
                result.alive,
                result.status,
                result.status_text,
                result.response_time.as_millis() as i64,
                result.final_url,
                page_type,
                title,
                result.message,
                screenshot,
            ])?;
        }

        let mut stmt =
            tx.prepare("INSERT INTO page_types (run_id, page_type, count) VALUES (?1, ?2, ?3)")?;
        for (page_type, count) in summary.page_types_sorted() {
            stmt.execute(params![run_id, page_type, count as i64])?;
        }
    }

    tx.commit()?;
    Ok(run_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{FailureKind, PageInfo};
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample() -> (Vec<ProbeResult>, RunSummary) {
        let mut alive = ProbeResult::alive(
            "www.example.com",
            StatusCode::FOUND,
            "https://www.example.com/login".to_string(),
            Duration::from_millis(80),
        );
        alive.page_info = Some(PageInfo {
            page_type: "login page".to_string(),
            title: "Sign in".to_string(),
        });

        let dead = ProbeResult::unreachable("old.example.com", FailureKind::Dns, Duration::ZERO);

        let summary = RunSummary {
            total: 2,
            alive: 1,
            dead: 1,
            page_types: HashMap::from([("login page".to_string(), 1)]),
            screenshots: 0,
            elapsed: Duration::from_millis(900),
        };

        (vec![alive, dead], summary)
    }

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_record_run_in_memory() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let (results, summary) = sample();
        let run_id = record_run(&mut conn, "abc123", results.iter(), &summary).unwrap();

        assert_eq!(count(&conn, "SELECT COUNT(*) FROM results"), 2);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM results WHERE alive = 1"), 1);

        let (hash, total): (String, i64) = conn
            .query_row(
                "SELECT config_hash, total FROM runs WHERE id = ?1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(hash, "abc123");
        assert_eq!(total, 2);

        let tally: i64 = conn
            .query_row(
                "SELECT count FROM page_types WHERE run_id = ?1 AND page_type = 'login page'",
                params![run_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tally, 1);

        let title: Option<String> = conn
            .query_row(
                "SELECT title FROM results WHERE domain = 'old.example.com'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(title.is_none());
    }

    #[test]
    fn test_runs_are_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.db");
        let (results, summary) = sample();

        let writer = SqliteReport::new(&path, true, "hash");
        writer.write(&results, &summary).unwrap();
        writer.write(&results, &summary).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM runs"), 2);
        // only_alive keeps one result per run
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM results"), 2);
    }
}
