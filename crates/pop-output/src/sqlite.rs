//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `trajectory`, `events`, and `lineage`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{EventRow, LineageRow, OutputResult, TrajectoryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS trajectory (
                 time REAL NOT NULL,
                 size REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS events (
                 time       REAL NOT NULL,
                 kind       TEXT NOT NULL,
                 agent_id   INTEGER,
                 related_id INTEGER,
                 channel    TEXT
             );
             CREATE TABLE IF NOT EXISTS lineage (
                 node        INTEGER PRIMARY KEY,
                 parent_node INTEGER
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_trajectory(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO trajectory (time, size) VALUES (?1, ?2)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.time, row.size])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO events (time, kind, agent_id, related_id, channel) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.time,
                    row.kind,
                    row.agent_id,
                    row.related_id,
                    row.channel,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_lineage(&mut self, rows: &[LineageRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO lineage (node, parent_node) VALUES (?1, ?2)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.node, row.parent_node])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
