use crate::{LlmProvider, ProviderError, SamplingConfig};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct LlamaServerConfig {
    pub base_url: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Text-completion provider for llama-server (and anything else speaking
/// the OpenAI-compatible `/v1/completions` endpoint).
#[derive(Clone)]
pub struct LlamaServerProvider {
    client: Client,
    cfg: Arc<LlamaServerConfig>,
}

impl LlamaServerProvider {
    pub fn new(cfg: LlamaServerConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

#[derive(Deserialize)]
struct CompletionApiResponse {
    choices: Vec<Choice>,
}

#[async_trait::async_trait]
impl LlmProvider for LlamaServerProvider {
    async fn complete(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        #[derive(serde::Serialize)]
        struct CompletionRequest<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            model: Option<&'a str>,
            prompt: &'a str,
            #[serde(flatten)]
            sampling: &'a SamplingConfig,
        }

        let body = CompletionRequest {
            model: self.cfg.model.as_deref(),
            prompt,
            sampling,
        };

        debug!(
            base_url = %self.cfg.base_url,
            prompt_len = prompt.len(),
            "sending completion request"
        );
        let mut req = self
            .client
            .post(format!("{}/v1/completions", self.cfg.base_url))
            .json(&body);
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: CompletionApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(ProviderError::EmptyCompletion)
    }
}
