use crate::model::EvaluationChecklist;
use async_trait::async_trait;

/// External judge model. Takes the judge instructions (checklist
/// contract) and the demarcated transcript prompt, and returns the
/// structured checklist. Any transport or output-shape failure is an
/// error; there is no partial success.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn judge(&self, instructions: &str, prompt: &str)
        -> anyhow::Result<EvaluationChecklist>;
    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod openai;
