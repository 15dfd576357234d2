use serde::{Deserialize, Serialize};

/// The fixed set of quality checks the judge is asked to satisfy, in the
/// order they are presented. Read-only after startup; changing it changes
/// what future evaluations check but never re-validates past results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    InstructionsFollow,
    AnswerRelevant,
}

impl CheckName {
    pub const ALL: [CheckName; 2] = [CheckName::InstructionsFollow, CheckName::AnswerRelevant];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::InstructionsFollow => "instructions_follow",
            CheckName::AnswerRelevant => "answer_relevant",
        }
    }

    /// Total inverse of `as_str`. Anything else is outside the taxonomy.
    pub fn parse(s: &str) -> Option<CheckName> {
        match s {
            "instructions_follow" => Some(CheckName::InstructionsFollow),
            "answer_relevant" => Some(CheckName::AnswerRelevant),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckName::InstructionsFollow => {
                "The agent followed the instructions it was given (in <INSTRUCTIONS>)"
            }
            CheckName::AnswerRelevant => "The response directly addresses the user's question",
        }
    }
}

/// Checklist text as presented to the judge, one line per check.
pub fn checklist_text() -> String {
    CheckName::ALL
        .iter()
        .map(|c| format!("- {}: {}", c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}
