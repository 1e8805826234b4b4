use crate::error::PipelineError;
use providers::EmbeddingProvider;
use std::sync::Arc;

/// Inputs longer than this are truncated at a char boundary before the
/// request is sent. Keeps oversized abstracts inside the backend's token
/// window with deterministic output.
pub const MAX_ENCODE_CHARS: usize = 8000;

/// Maps text to fixed-width dense vectors through a shared provider handle.
/// The handle is built once at startup; concurrent requests read it freely.
#[derive(Clone)]
pub struct Encoder {
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
}

impl Encoder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimension: usize) -> Self {
        Self {
            provider,
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn encode(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let mut vectors = self.encode_many(&[text.to_string()]).await?;
        Ok(vectors.remove(0))
    }

    /// Batch form: one vector per input, in input order. Preferred whenever
    /// more than one text is known up front, so the backend can batch.
    pub async fn encode_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let inputs: Vec<String> = texts.iter().map(|t| truncate_chars(t, MAX_ENCODE_CHARS)).collect();
        let resp = self
            .provider
            .embed(&inputs)
            .await
            .map_err(|e| PipelineError::Encoding(e.to_string()))?;

        if resp.vectors.len() != texts.len() {
            return Err(PipelineError::Encoding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                resp.vectors.len()
            )));
        }
        for v in &resp.vectors {
            if v.len() != self.dimension {
                return Err(PipelineError::Encoding(format!(
                    "model returned width {} but index expects {}",
                    v.len(),
                    self.dimension
                )));
            }
        }
        Ok(resp.vectors)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
