use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for transcript files.
    pub logs_dir: PathBuf,
    /// Glob selecting transcript files within `logs_dir`.
    pub file_glob: String,
    /// File-name prefix marking a transcript as processed.
    pub processed_prefix: String,
    /// SQLite database location.
    pub database_url: PathBuf,
    pub debug: bool,
    pub judge_model: String,
    /// Upper bound on a single judge call; a hung judge otherwise stalls
    /// the whole pass.
    pub judge_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            file_glob: "*.json".into(),
            processed_prefix: "processed_".into(),
            database_url: PathBuf::from("data/monitoring.db"),
            debug: false,
            judge_model: "gpt-4o-mini".into(),
            judge_timeout_seconds: 60,
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: Settings = serde_yaml::from_str(&raw).context("failed to parse YAML")?;
    if cfg.file_glob.trim().is_empty() {
        anyhow::bail!("config error: file_glob is empty");
    }
    if cfg.processed_prefix.trim().is_empty() {
        anyhow::bail!("config error: processed_prefix is empty (processed files would be rescanned forever)");
    }
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, include_str!("../../../arbiter.yaml"))
        .with_context(|| format!("failed to write sample config {}", path.display()))
}
