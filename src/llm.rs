//! OpenRouter chat-completion client
//!
//! Sends one non-streaming completion per call and hands back the first choice's
//! text untouched.

use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ProxyError;
use crate::client::build_client;
use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct CompletionClient {
    http: ClientWithMiddleware,
    config: LlmConfig,
}

impl CompletionClient {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let http = build_client(config.timeout_seconds, config.max_retries)?;
        Ok(Self { http, config })
    }

    /// Free-form analysis of a planned day
    pub async fn analyze(&self, prompt: &str) -> Result<String, ProxyError> {
        self.complete(&self.config.analysis_model, prompt, &[]).await
    }

    /// Slot suggestions for a day. The request identifies the calling application
    /// through `HTTP-Referer` and `X-Title`.
    pub async fn autofill(&self, prompt: &str) -> Result<String, ProxyError> {
        let attribution = [
            ("HTTP-Referer", self.config.referer.as_str()),
            ("X-Title", self.config.app_title.as_str()),
        ];
        self.complete(&self.config.autofill_model, prompt, &attribution)
            .await
    }

    #[instrument(skip(self, prompt, headers), fields(prompt_len = prompt.len()))]
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, ProxyError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| ProxyError::configuration("Server missing API key"))?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = CompletionRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.http.post(url).bearer_auth(api_key).json(&body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        debug!("Requesting completion");
        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::upstream(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("AI Provider Error: {}", status.as_u16()),
            ));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::transport(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                ProxyError::upstream(StatusCode::INTERNAL_SERVER_ERROR, "No AI response content")
            })?;

        info!(chars = content.len(), "Completion received");
        Ok(content)
    }
}
