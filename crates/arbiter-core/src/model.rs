use crate::taxonomy::CheckName;
use serde::{Deserialize, Serialize};

/// One ingested transcript. Written once by the store, never mutated;
/// deleted only by operator action (which cascades to its checks).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogRecord {
    pub filepath: String,
    pub agent_name: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub user_prompt: Option<String>,
    pub instructions: Option<String>,
    /// JSON-serialized `Vec<ToolCall>`.
    pub tool_calls: Option<String>,
    pub total_input_tokens: Option<i64>,
    pub total_output_tokens: Option<i64>,
    pub assistant_answer: Option<String>,
    /// Full serialized transcript, retained for re-evaluation and audit.
    pub raw_transcript: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: serde_json::Value,
}

/// Tri-state judgment. `Unknown` means the judge never addressed the
/// check; it is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Failed,
    Unknown,
}

impl CheckOutcome {
    pub fn from_pass(pass: bool) -> Self {
        if pass {
            CheckOutcome::Passed
        } else {
            CheckOutcome::Failed
        }
    }

    /// Stored form: 1 / 0 / NULL.
    pub fn to_sql(self) -> Option<i64> {
        match self {
            CheckOutcome::Passed => Some(1),
            CheckOutcome::Failed => Some(0),
            CheckOutcome::Unknown => None,
        }
    }

    pub fn from_sql(v: Option<i64>) -> anyhow::Result<Self> {
        match v {
            Some(1) => Ok(CheckOutcome::Passed),
            Some(0) => Ok(CheckOutcome::Failed),
            None => Ok(CheckOutcome::Unknown),
            Some(other) => anyhow::bail!("invalid stored pass value: {}", other),
        }
    }
}

/// One (log, check-name) judgment. Written in a batch by the evaluator
/// step, never mutated, deleted only via its owning log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub log_id: i64,
    pub check_name: CheckName,
    pub outcome: CheckOutcome,
    pub details: Option<String>,
}

/// The judge's structured output. Consumed immediately to produce
/// `CheckResult`s and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationChecklist {
    pub checklist: Vec<ChecklistEntry>,
    #[serde(default)]
    pub summary: String,
}

/// `check_name` stays a raw string here; it is validated against the
/// taxonomy only after parsing, so an out-of-taxonomy name can be
/// rejected with a report instead of a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub check_name: String,
    pub reasoning: String,
    pub check_pass: bool,
}
