use crate::model::{LogRecord, ToolCall};
use anyhow::Context;
use std::path::Path;

/// Extracts the persisted fields from one transcript file: an ordered
/// sequence of messages, each with ordered parts. Only the part kinds
/// below are interpreted; the rest of the document is opaque and kept
/// verbatim in `raw_transcript`.
///
/// - `system-prompt` -> instructions
/// - `user-prompt`   -> user prompt
/// - `text`          -> assistant answer (last one wins)
/// - `tool-call`     -> tool-call log; `final_result` entries are the
///   agent's finished output, not tool usage, and are excluded
pub fn parse_log_file(path: &Path) -> anyhow::Result<LogRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("malformed transcript {}", path.display()))?;

    let mut user_prompt = None;
    let mut instructions = None;
    let mut assistant_answer = None;
    let mut tool_calls: Vec<ToolCall> = Vec::new();
    let mut input_tokens: i64 = 0;
    let mut output_tokens: i64 = 0;
    let mut saw_usage = false;

    let messages = doc.get("messages").and_then(|v| v.as_array());
    for msg in messages.into_iter().flatten() {
        if let Some(usage) = msg.get("usage") {
            saw_usage = true;
            input_tokens += usage
                .get("input_tokens")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            output_tokens += usage
                .get("output_tokens")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
        }

        let parts = msg.get("parts").and_then(|v| v.as_array());
        for part in parts.into_iter().flatten() {
            let kind = part.get("part_kind").and_then(|v| v.as_str());
            let content = part
                .get("content")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            match kind {
                Some("system-prompt") => instructions = content,
                Some("user-prompt") => user_prompt = content,
                Some("text") => assistant_answer = content,
                Some("tool-call") => {
                    let Some(name) = part.get("tool_name").and_then(|v| v.as_str()) else {
                        tracing::warn!(path = %path.display(), "tool-call part without tool_name");
                        continue;
                    };
                    if name == "final_result" {
                        continue;
                    }
                    tool_calls.push(ToolCall {
                        name: name.to_string(),
                        args: parse_args(part.get("args")),
                    });
                }
                _ => {}
            }
        }
    }

    Ok(LogRecord {
        filepath: path.to_string_lossy().into_owned(),
        agent_name: str_field(&doc, "agent_name"),
        provider: str_field(&doc, "provider"),
        model: str_field(&doc, "model"),
        user_prompt,
        instructions,
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&tool_calls)?)
        },
        total_input_tokens: saw_usage.then_some(input_tokens),
        total_output_tokens: saw_usage.then_some(output_tokens),
        assistant_answer,
        raw_transcript: Some(raw),
    })
}

// Tool-call args arrive either as an embedded object or as a serialized
// string; a string that is not valid JSON is kept as-is.
fn parse_args(v: Option<&serde_json::Value>) -> serde_json::Value {
    match v {
        Some(serde_json::Value::String(s)) => {
            serde_json::from_str(s).unwrap_or(serde_json::Value::String(s.clone()))
        }
        Some(other) => other.clone(),
        None => serde_json::Value::Null,
    }
}

fn str_field(doc: &serde_json::Value, key: &str) -> Option<String> {
    doc.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}
