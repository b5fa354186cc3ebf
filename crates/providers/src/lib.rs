//! Provider abstractions for generative-model collaborators.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod llama_server;
pub mod noop;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("model returned no choices")]
    EmptyCompletion,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Sampling parameters sent with every completion call.
///
/// Fixed for the whole run; the pinned seed keeps repeated runs over the
/// same library comparable.
#[derive(Debug, Clone, Serialize)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub min_p: f32,
    pub repeat_penalty: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub seed: i64,
    pub stream: bool,
    pub stop: Vec<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.8,
            top_p: 0.9,
            top_k: 50,
            min_p: 0.05,
            repeat_penalty: 1.1,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            seed: 0,
            stream: false,
            stop: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one non-streaming completion and return the raw generated text.
    async fn complete(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    llms: HashMap<String, Arc<dyn LlmProvider>>,
    pub preferred_llm: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm(mut self, name: &str, provider: Arc<dyn LlmProvider>) -> Self {
        self.llms.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred_llm(mut self, name: &str) -> Self {
        self.preferred_llm = Some(name.to_string());
        self
    }

    pub fn llm(&self, name: Option<&str>) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred_llm.clone())
            .ok_or_else(|| ProviderError::UnknownProvider("no llm provider configured".into()))?;
        self.llms
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }
}
