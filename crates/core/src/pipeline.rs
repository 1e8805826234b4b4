use crate::analyzer::RiskAnalyzer;
use crate::config::AppConfig;
use crate::embeddings::Encoder;
use crate::error::PipelineError;
use crate::index::{QdrantIndex, VectorIndex};
use crate::models::PipelineResult;
use providers::noop::NoopProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::qdrant::{QdrantClient, QdrantConfig};
use providers::ProviderRegistry;
use std::sync::Arc;
use tracing::info;

/// Matches retrieved per analysis request.
pub const TOP_K: usize = 5;

/// Queries shorter than this after trimming are rejected up front.
pub const MIN_QUERY_CHARS: usize = 10;

/// The end-to-end analysis pipeline. Holds one encoder, one index handle,
/// and one analyzer; constructed once at startup and shared across requests.
/// All collaborators sit behind traits so tests can substitute mocks.
pub struct Pipeline {
    encoder: Encoder,
    index: Arc<dyn VectorIndex>,
    analyzer: RiskAnalyzer,
}

impl Pipeline {
    pub fn new(encoder: Encoder, index: Arc<dyn VectorIndex>, analyzer: RiskAnalyzer) -> Self {
        Self {
            encoder,
            index,
            analyzer,
        }
    }

    /// Validate, encode, retrieve, analyze. Errors propagate unchanged from
    /// each step; this is the single place they surface to the caller.
    pub async fn run(&self, query: &str) -> Result<PipelineResult, PipelineError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return Err(PipelineError::InvalidInput(format!(
                "invention idea must be at least {} characters long",
                MIN_QUERY_CHARS
            )));
        }

        info!(preview = %trimmed.chars().take(100).collect::<String>(), "analyzing invention idea");

        let vector = self.encoder.encode(trimmed).await?;

        info!("querying index for similar patents");
        let matches = self.index.query(&vector, TOP_K).await?;
        if matches.is_empty() {
            return Err(PipelineError::NoPriorArt);
        }

        info!(matches = matches.len(), "running risk analysis");
        let analysis = self.analyzer.analyze(trimmed, &matches).await?;
        info!(risk_level = %analysis.risk_level, "analysis complete");

        Ok(PipelineResult {
            risk_level: analysis.risk_level,
            analysis: analysis.analysis,
            conflicting_patents: analysis.conflicting_patents,
            recommendations: analysis.recommendations,
            retrieved_matches: matches,
        })
    }
}

/// Builds the provider registry from config plus environment credentials.
/// Groq exposes an OpenAI-compatible surface, so both share one provider
/// type with different base URLs.
pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new().with_embedding("noop", Arc::new(NoopProvider));

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: key,
            base_url,
            embedding_model: config.embeddings.model.clone(),
            chat_model: config.analysis.model.clone(),
        });
        reg = reg
            .with_embedding("openai", Arc::new(provider.clone()))
            .with_chat("openai", Arc::new(provider));
    }

    if let Ok(key) = std::env::var("GROQ_API_KEY") {
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: key,
            base_url: "https://api.groq.com/openai".to_string(),
            embedding_model: config.embeddings.model.clone(),
            chat_model: config.analysis.model.clone(),
        });
        reg = reg.with_chat("groq", Arc::new(provider));
    }

    reg.set_preferred_embedding(&config.embeddings.provider)
        .set_preferred_chat(&config.analysis.provider)
}

/// `dimension` is the encoder's output width; the index collection must be
/// created with exactly that width.
pub fn build_index(
    config: &AppConfig,
    dimension: usize,
) -> Result<Arc<dyn VectorIndex>, PipelineError> {
    let url = config
        .vectors
        .url
        .clone()
        .ok_or_else(|| PipelineError::Config("vectors.url is not set".into()))?;
    let client = QdrantClient::new(QdrantConfig {
        url,
        collection: config.vectors.collection.clone(),
        api_key: std::env::var("QDRANT_API_KEY").ok(),
    });
    Ok(Arc::new(QdrantIndex::new(client, dimension)))
}

pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline, PipelineError> {
    let registry = build_registry(config);
    let embedding = registry
        .embedding(None)
        .map_err(|e| PipelineError::Config(e.to_string()))?;
    let chat = registry
        .chat(None)
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    let encoder = Encoder::new(embedding, config.embeddings.dimension);
    let index = build_index(config, encoder.dimension())?;
    let analyzer = RiskAnalyzer::new(
        chat,
        config.analysis.temperature,
        config.analysis.max_tokens,
    );
    Ok(Pipeline::new(encoder, index, analyzer))
}
