use anyhow::Context;
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};

/// Enumerates unprocessed transcript files in a directory and marks
/// files processed by renaming them with a prefix. The rename is the
/// pipeline's sole crash-recovery primitive: until a file carries the
/// prefix it stays eligible for retry, giving at-least-once delivery.
pub struct DirectorySource {
    dir: PathBuf,
    matcher: GlobMatcher,
    processed_prefix: String,
}

impl DirectorySource {
    pub fn new(
        dir: impl Into<PathBuf>,
        pattern: &str,
        processed_prefix: &str,
    ) -> anyhow::Result<Self> {
        let matcher = Glob::new(pattern)
            .with_context(|| format!("invalid file glob {:?}", pattern))?
            .compile_matcher();
        Ok(Self {
            dir: dir.into(),
            matcher,
            processed_prefix: processed_prefix.to_string(),
        })
    }

    /// Currently unprocessed files, sorted for a deterministic pass
    /// order. Safe to call repeatedly as the steady-state polling
    /// primitive; files marked since the last call no longer appear. A
    /// missing or unreadable directory is fatal; an unreadable single
    /// entry is reported and skipped.
    pub fn iterate(&self) -> anyhow::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read logs dir {}", self.dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, dir = %self.dir.display(), "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(&self.processed_prefix) {
                continue;
            }
            if !self.matcher.is_match(name) {
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    /// Idempotent: marking an already-marked path is a no-op.
    pub fn mark_processed(&self, path: &Path) -> anyhow::Result<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("path has no file name: {}", path.display()))?;
        if name.starts_with(&self.processed_prefix) {
            return Ok(());
        }
        let target = path.with_file_name(format!("{}{}", self.processed_prefix, name));
        if !path.exists() && target.exists() {
            // Already marked by an earlier call.
            return Ok(());
        }
        std::fs::rename(path, &target)
            .with_context(|| format!("failed to mark {} processed", path.display()))?;
        Ok(())
    }
}
