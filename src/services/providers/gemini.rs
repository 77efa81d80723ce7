/// Gemini generative completion provider
///
/// Calls the `generateContent` REST endpoint with a JSON response MIME type
/// so the model answers with a machine-parseable payload. Any failure here
/// is reported as `AppError::Generative`; the orchestrator treats that as
/// "no result" and falls back to the heuristic miners.
use crate::{
    error::{AppError, AppResult},
    services::providers::CompletionSource,
};
use reqwest::Client as HttpClient;
use serde_json::json;
use std::time::Duration;

const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.8;
const TOP_K: u32 = 40;

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http_client,
            api_url,
            api_key,
            model,
        })
    }
}

#[async_trait::async_trait]
impl CompletionSource for GeminiProvider {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::Generative("no API key configured".to_string()));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let request = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": TEMPERATURE,
                "topP": TOP_P,
                "topK": TOP_K,
            }
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Generative(format!("completion call failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generative(format!(
                "completion endpoint returned status {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Generative(format!("invalid completion response: {}", e)))?;

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Generative("completion response has no text".to_string()))
    }
}
