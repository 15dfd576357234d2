use crate::evaluator::Evaluator;
use crate::parser;
use crate::source::DirectorySource;
use crate::storage::Store;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

pub struct Runner {
    pub source: DirectorySource,
    pub store: Store,
    pub evaluator: Arc<dyn Evaluator>,
    pub judge_timeout: Duration,
}

#[derive(Debug, Default)]
pub struct PassSummary {
    pub processed: usize,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl Runner {
    /// One batch pass over every currently unprocessed file, strictly
    /// one file at a time and strictly in order: parse, persist the log
    /// entry, evaluate to completion, persist the checks, mark
    /// processed. Marking is always last, so a crash mid-file leaves it
    /// eligible for retry on the next pass (at-least-once delivery).
    pub async fn run_once(&self) -> anyhow::Result<PassSummary> {
        self.store.ensure_schema()?;

        let mut summary = PassSummary::default();
        for path in self.source.iterate()? {
            match self.process_file(&path).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    // A single bad file is reported and skipped; an
                    // unreachable store makes the rest of the pass
                    // pointless.
                    if self.store.ping().is_err() {
                        return Err(e.context("store unreachable, aborting pass"));
                    }
                    tracing::warn!(path = %path.display(), error = format!("{e:#}"), "file skipped");
                    summary.skipped.push(SkippedFile {
                        path,
                        reason: format!("{e:#}"),
                    });
                }
            }
        }
        Ok(summary)
    }

    async fn process_file(&self, path: &Path) -> anyhow::Result<()> {
        let record = parser::parse_log_file(path)?;

        // Retry reconciliation: a pass interrupted after insert_log but
        // before mark_processed leaves this filepath with an existing
        // log entry. Reuse that entry, clearing any checks it
        // accumulated, only when its stored transcript matches the file
        // being retried; a re-ingested file whose content changed gets
        // a fresh row, so checks never attach to a stale transcript.
        let mut reused = None;
        if let Some(existing) = self.store.find_log_by_filepath(&record.filepath)? {
            if self.store.raw_transcript(existing)? == record.raw_transcript {
                tracing::info!(
                    log_id = existing,
                    path = %path.display(),
                    "reusing log entry from an earlier interrupted pass"
                );
                self.store.delete_checks_for_log(existing)?;
                reused = Some(existing);
            }
        }
        let log_id = match reused {
            Some(existing) => existing,
            None => self.store.insert_log(&record)?,
        };

        let checks = timeout(self.judge_timeout, self.evaluator.evaluate(log_id, &record))
            .await
            .map_err(|_| {
                anyhow::anyhow!("evaluation timed out after {}s", self.judge_timeout.as_secs())
            })??;
        self.store.insert_checks(&checks)?;
        tracing::info!(
            log_id,
            path = %path.display(),
            checks = checks.len(),
            "file evaluated"
        );

        self.source.mark_processed(path)?;
        Ok(())
    }
}
