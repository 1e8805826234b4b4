#![allow(dead_code)]

use patentguard_core::error::PipelineError;
use patentguard_core::index::VectorIndex;
use patentguard_core::models::{PatentMatch, PatentRecord};
use providers::{ChatProvider, ChatRequest, EmbedResponse, EmbeddingProvider, ProviderError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const DIM: usize = 4;

/// Embedding provider returning constant vectors of width `DIM`, counting
/// calls and recording the inputs it saw.
#[derive(Default)]
pub struct CountingEmbedder {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().extend(texts.iter().cloned());
        Ok(EmbedResponse {
            vectors: vec![vec![0.1; DIM]; texts.len()],
        })
    }
}

/// Index double: serves preset matches, records the `top_k` it was asked
/// for and every record upserted into it.
#[derive(Default)]
pub struct MockIndex {
    pub matches: Vec<PatentMatch>,
    pub query_calls: AtomicUsize,
    pub ensure_calls: AtomicUsize,
    pub seen_top_k: Mutex<Vec<usize>>,
    pub upserted: Mutex<Vec<PatentRecord>>,
    pub fail_queries: bool,
}

impl MockIndex {
    pub fn with_matches(matches: Vec<PatentMatch>) -> Self {
        Self {
            matches,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for MockIndex {
    async fn ensure_collection(&self) -> Result<(), PipelineError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, records: Vec<PatentRecord>) -> Result<(), PipelineError> {
        self.upserted.lock().unwrap().extend(records);
        Ok(())
    }

    async fn query(
        &self,
        _vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<PatentMatch>, PipelineError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_top_k.lock().unwrap().push(top_k);
        if self.fail_queries {
            return Err(PipelineError::IndexUnavailable("connection refused".into()));
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}

/// Chat provider replying with a fixed script, or failing when `fail` is
/// set.
#[derive(Default)]
pub struct ScriptedChat {
    pub reply: String,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl ScriptedChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedChat {
    async fn chat(&self, _req: &ChatRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::RequestFailed("quota exceeded".into()));
        }
        Ok(self.reply.clone())
    }
}

pub fn patent_match(id: &str, score: f32, title: &str, abstract_text: &str) -> PatentMatch {
    let mut metadata = HashMap::new();
    metadata.insert("title".to_string(), title.to_string());
    metadata.insert("abstract".to_string(), abstract_text.to_string());
    PatentMatch {
        id: id.to_string(),
        score,
        metadata,
    }
}
