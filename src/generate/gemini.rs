// src/generate/gemini.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Generator, PromptContext};
use crate::config::GeneratorConfig;

/// Gemini `generateContent` REST client.
pub struct GeminiGenerator {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl GeminiGenerator {
    pub fn new(api_key: String, cfg: &GeneratorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("page-autopost/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_key,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Req<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<RespContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Concatenated text parts of the first candidate; blocked or empty output is an error.
fn extract_text(resp: Resp) -> Result<String> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        bail!("prompt blocked: {reason}");
    }
    let first = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no candidates in response"))?;
    let text: String = first
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!(
            "empty response (finish reason: {})",
            first.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

#[async_trait::async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &PromptContext) -> Result<String> {
        let req = Req {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt.user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("gemini returned {status}: {}", body.trim());
        }
        let body: Resp = resp.json().await.context("decoding gemini response")?;
        extract_text(body)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let resp: Resp = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hola "},{"text":"Quito"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "Hola Quito");
    }

    #[test]
    fn blocked_and_empty_responses_are_errors() {
        let blocked: Resp =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(extract_text(blocked).is_err());

        let empty: Resp =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#).unwrap();
        let err = extract_text(empty).unwrap_err().to_string();
        assert!(err.contains("MAX_TOKENS"));
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let req = Req {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(v["systemInstruction"].get("role").is_none());
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["generationConfig"]["temperature"], 0.5);
    }
}
