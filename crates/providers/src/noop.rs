use crate::{ChatProvider, ChatRequest, EmbedResponse, EmbeddingProvider, ProviderError};

#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for NoopProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: vec![vec![]; texts.len()],
        })
    }
}

#[async_trait::async_trait]
impl ChatProvider for NoopProvider {
    async fn chat(&self, _req: &ChatRequest) -> Result<String, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}
