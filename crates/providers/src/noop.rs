use crate::{LlmProvider, ProviderError, SamplingConfig};

/// Placeholder provider registered when no model endpoint is configured.
/// Every call fails, which the pipeline treats as "skip this batch".
#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl LlmProvider for NoopProvider {
    async fn complete(
        &self,
        _prompt: &str,
        _sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}
