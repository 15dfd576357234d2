use super::JudgeClient;
use crate::model::EvaluationChecklist;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

pub struct OpenAiJudge {
    pub model: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl OpenAiJudge {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl JudgeClient for OpenAiJudge {
    async fn judge(
        &self,
        instructions: &str,
        prompt: &str,
    ) -> anyhow::Result<EvaluationChecklist> {
        let url = "https://api.openai.com/v1/chat/completions";

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": instructions},
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.0,
            "response_format": {"type": "json_object"},
        });

        let resp = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI chat API error: {}", error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let content = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing content"))?;

        parse_checklist(content)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// Models occasionally wrap JSON output in a markdown fence even when a
// JSON response format was requested.
fn parse_checklist(text: &str) -> anyhow::Result<EvaluationChecklist> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.strip_suffix("```").unwrap_or(s))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(trimmed).context("judge returned a malformed checklist")
}
