use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::Config;
use crate::screenshot::Screenshot;

/// The remote vision model: system instruction, user text and one image in,
/// free-form text out.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        screenshot: &Screenshot,
    ) -> Result<String>;
}

/// Google Gemini `generateContent` client.
pub struct GeminiBrain {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiBrain {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            api_key,
            model: config.model.trim().to_string(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        let model_path = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

#[async_trait]
impl Generate for GeminiBrain {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        screenshot: &Screenshot,
    ) -> Result<String> {
        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": screenshot.mime_type(),
                            "data": screenshot.to_base64(),
                        }
                    },
                    { "text": user_text }
                ]
            }],
            "generationConfig": {
                "temperature": self.temperature,
            }
        });

        let endpoint = self.endpoint();
        tracing::debug!(%endpoint, model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .context("Gemini response body read failed")?;

        if !status.is_success() {
            let err_msg = serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| truncate(&raw, 512));
            tracing::warn!(%status, "Gemini API error: {}", err_msg);
            bail!("Gemini API error ({}): {}", status, err_msg);
        }

        let json_resp: Value =
            serde_json::from_str(&raw).context("Gemini returned invalid JSON payload")?;
        extract_reply_text(&json_resp)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_reply_text(json_resp: &Value) -> Result<String> {
    let Some(candidate) = json_resp["candidates"].get(0) else {
        let reason = json_resp["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(anyhow!("Gemini returned no reply: {}", reason));
    };

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
