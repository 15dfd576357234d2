use crate::model::{CheckOutcome, CheckResult, LogRecord};
use crate::taxonomy::CheckName;
use anyhow::Context;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Handle on the audit database. Every operation opens its own
/// connection and transaction scope: the access pattern is one file at
/// a time at low volume, and short-lived connections leak no state
/// across the runner's per-file loop.
#[derive(Clone)]
pub struct Store {
    db_path: PathBuf,
}

/// One row of the `arbiter logs` audit listing.
#[derive(Debug)]
pub struct LogSummary {
    pub id: i64,
    pub filepath: String,
    pub agent_name: Option<String>,
    pub model: Option<String>,
    pub check_count: i64,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create db dir {}", parent.display()))?;
            }
        }
        Ok(Self {
            db_path: path.to_path_buf(),
        })
    }

    fn connect(&self) -> anyhow::Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("failed to open sqlite db {}", self.db_path.display()))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(conn)
    }

    /// Safe to call on every startup, including on an existing,
    /// populated database.
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    /// Cheap connectivity probe, used to tell a bad row apart from an
    /// unreachable store.
    pub fn ping(&self) -> anyhow::Result<()> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    }

    /// Returns the generated id; strictly increasing within one store
    /// lifetime (sqlite AUTOINCREMENT).
    pub fn insert_log(&self, rec: &LogRecord) -> anyhow::Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO log_entries(
                filepath, agent_name, provider, model, user_prompt, instructions,
                tool_calls, total_input_tokens, total_output_tokens,
                assistant_answer, raw_transcript)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                rec.filepath,
                rec.agent_name,
                rec.provider,
                rec.model,
                rec.user_prompt,
                rec.instructions,
                rec.tool_calls,
                rec.total_input_tokens,
                rec.total_output_tokens,
                rec.assistant_answer,
                rec.raw_transcript,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Batch insert in one transaction. An empty batch is a no-op and
    /// opens no connection.
    pub fn insert_checks(&self, checks: &[CheckResult]) -> anyhow::Result<()> {
        if checks.is_empty() {
            return Ok(());
        }
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO check_results(log_id, check_name, passed, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            let created_at = chrono::Utc::now().to_rfc3339();
            for c in checks {
                stmt.execute(params![
                    c.log_id,
                    c.check_name.as_str(),
                    c.outcome.to_sql(),
                    c.details,
                    created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Latest log entry for a filepath, if any. Used by the runner's
    /// retry reconciliation and by the duplicate-anomaly check.
    pub fn find_log_by_filepath(&self, filepath: &str) -> anyhow::Result<Option<i64>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT id FROM log_entries WHERE filepath = ?1 ORDER BY id DESC LIMIT 1")?;
        let mut rows = stmt.query(params![filepath])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Stored transcript body for a log entry. The runner compares it
    /// against the file on disk to decide whether an unmarked file is a
    /// retry of the same ingestion or changed content.
    pub fn raw_transcript(&self, log_id: i64) -> anyhow::Result<Option<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT raw_transcript FROM log_entries WHERE id = ?1")?;
        let mut rows = stmt.query(params![log_id])?;
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(None),
        }
    }

    pub fn checks_for_log(&self, log_id: i64) -> anyhow::Result<Vec<CheckResult>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT log_id, check_name, passed, details
             FROM check_results WHERE log_id = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![log_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            // Flag any stored value outside the taxonomy on read.
            let check_name = CheckName::parse(&name)
                .ok_or_else(|| anyhow::anyhow!("stored check_name {:?} is not in the taxonomy", name))?;
            out.push(CheckResult {
                log_id: row.get(0)?,
                check_name,
                outcome: CheckOutcome::from_sql(row.get(2)?)?,
                details: row.get(3)?,
            });
        }
        Ok(out)
    }

    /// Clears checks left behind by a pass that was interrupted between
    /// inserting checks and marking the file processed.
    pub fn delete_checks_for_log(&self, log_id: i64) -> anyhow::Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM check_results WHERE log_id = ?1", params![log_id])?;
        Ok(())
    }

    pub fn recent_logs(&self, limit: u32) -> anyhow::Result<Vec<LogSummary>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT l.id, l.filepath, l.agent_name, l.model,
                    (SELECT count(*) FROM check_results c WHERE c.log_id = l.id)
             FROM log_entries l ORDER BY l.id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(LogSummary {
                id: row.get(0)?,
                filepath: row.get(1)?,
                agent_name: row.get(2)?,
                model: row.get(3)?,
                check_count: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Operator deletion; cascades to the log's check results. Returns
    /// whether a row was deleted.
    pub fn delete_log(&self, log_id: i64) -> anyhow::Result<bool> {
        let conn = self.connect()?;
        let n = conn.execute("DELETE FROM log_entries WHERE id = ?1", params![log_id])?;
        Ok(n > 0)
    }
}
