use crate::model::{CheckOutcome, CheckResult, EvaluationChecklist, LogRecord};
use crate::providers::judge::JudgeClient;
use crate::taxonomy::{self, CheckName};
use async_trait::async_trait;
use std::sync::Arc;

/// A strategy for turning one persisted transcript into a batch of
/// check judgments. May suspend while it invokes an external judge.
/// Must complete fully: a full batch or an error, never a silent
/// partial result. New evaluators are added as new implementations.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, log_id: i64, record: &LogRecord) -> anyhow::Result<Vec<CheckResult>>;
}

/// Default evaluator: conditions an external judge on the taxonomy
/// checklist and maps its structured verdicts to check results.
pub struct LlmEvaluator {
    client: Arc<dyn JudgeClient>,
}

impl LlmEvaluator {
    pub fn new(client: Arc<dyn JudgeClient>) -> Self {
        Self { client }
    }

    fn judge_instructions() -> String {
        format!(
            "Use this checklist to evaluate the quality of an AI agent's answer (<ANSWER>) \
             to a user question (<QUESTION>). The full transcript (<LOG>) is included for analysis.\n\n\
             For each item of the checklist, check if the condition is met.\n\n\
             Checklist:\n\n{}\n\n\
             Respond with a JSON object of the form \
             {{\"checklist\": [{{\"check_name\": \"...\", \"reasoning\": \"...\", \"check_pass\": true}}], \
             \"summary\": \"...\"}}. \
             Output true/false for each check and provide a short explanation for your judgment.",
            taxonomy::checklist_text()
        )
    }

    // Each section is demarcated so the judge cannot conflate them.
    fn judge_prompt(record: &LogRecord) -> String {
        format!(
            "<INSTRUCTIONS>{}</INSTRUCTIONS>\n\
             <QUESTION>{}</QUESTION>\n\
             <ANSWER>{}</ANSWER>\n\
             <TOOLS>{}</TOOLS>\n\
             <LOG>{}</LOG>",
            record.instructions.as_deref().unwrap_or(""),
            record.user_prompt.as_deref().unwrap_or(""),
            record.assistant_answer.as_deref().unwrap_or(""),
            record.tool_calls.as_deref().unwrap_or(""),
            record.raw_transcript.as_deref().unwrap_or(""),
        )
    }

    /// A check name outside the taxonomy is a validation error: it is
    /// reported and rejected, without aborting the remaining checks. A
    /// check the judge omitted simply yields no result.
    fn map_checklist(log_id: i64, output: EvaluationChecklist) -> Vec<CheckResult> {
        let mut checks = Vec::new();
        for entry in output.checklist {
            let Some(check_name) = CheckName::parse(&entry.check_name) else {
                tracing::warn!(
                    log_id,
                    check_name = %entry.check_name,
                    "judge returned a check name outside the taxonomy; rejected"
                );
                continue;
            };
            checks.push(CheckResult {
                log_id,
                check_name,
                outcome: CheckOutcome::from_pass(entry.check_pass),
                details: Some(entry.reasoning),
            });
        }
        checks
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(&self, log_id: i64, record: &LogRecord) -> anyhow::Result<Vec<CheckResult>> {
        let instructions = Self::judge_instructions();
        let prompt = Self::judge_prompt(record);

        let output = self.client.judge(&instructions, &prompt).await?;
        tracing::debug!(
            log_id,
            provider = self.client.provider_name(),
            entries = output.checklist.len(),
            summary = %output.summary,
            "judge checklist received"
        );

        Ok(Self::map_checklist(log_id, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChecklistEntry;

    fn entry(name: &str, pass: bool) -> ChecklistEntry {
        ChecklistEntry {
            check_name: name.into(),
            reasoning: format!("{name} reasoning"),
            check_pass: pass,
        }
    }

    #[test]
    fn full_checklist_maps_one_result_per_check() {
        let output = EvaluationChecklist {
            checklist: vec![entry("instructions_follow", true), entry("answer_relevant", false)],
            summary: "mixed".into(),
        };
        let checks = LlmEvaluator::map_checklist(7, output);
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].log_id, 7);
        assert_eq!(checks[0].check_name, CheckName::InstructionsFollow);
        assert_eq!(checks[0].outcome, CheckOutcome::Passed);
        assert_eq!(checks[1].outcome, CheckOutcome::Failed);
        assert_eq!(checks[1].details.as_deref(), Some("answer_relevant reasoning"));
    }

    #[test]
    fn unknown_check_name_is_rejected_without_aborting_the_rest() {
        let output = EvaluationChecklist {
            checklist: vec![entry("tone_of_voice", true), entry("answer_relevant", true)],
            summary: String::new(),
        };
        let checks = LlmEvaluator::map_checklist(1, output);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].check_name, CheckName::AnswerRelevant);
    }

    #[test]
    fn omitted_check_yields_no_result() {
        let output = EvaluationChecklist {
            checklist: vec![entry("answer_relevant", true)],
            summary: String::new(),
        };
        let checks = LlmEvaluator::map_checklist(1, output);
        assert!(checks
            .iter()
            .all(|c| c.check_name != CheckName::InstructionsFollow));
    }

    #[test]
    fn judge_prompt_demarcates_sections() {
        let record = LogRecord {
            filepath: "x.json".into(),
            user_prompt: Some("where do capybaras live?".into()),
            instructions: Some("answer relevant".into()),
            assistant_answer: Some("near water".into()),
            ..Default::default()
        };
        let prompt = LlmEvaluator::judge_prompt(&record);
        assert!(prompt.contains("<QUESTION>where do capybaras live?</QUESTION>"));
        assert!(prompt.contains("<INSTRUCTIONS>answer relevant</INSTRUCTIONS>"));
        assert!(prompt.contains("<ANSWER>near water</ANSWER>"));
    }
}
