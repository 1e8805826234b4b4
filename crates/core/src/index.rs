use crate::error::PipelineError;
use crate::models::{PatentMatch, PatentRecord};
use providers::qdrant::{QdrantClient, QdrantPoint};
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Upserts are chunked at this size to respect backend payload limits.
pub const UPSERT_BATCH_SIZE: usize = 100;

const DISTANCE: &str = "Cosine";

/// Storage/query seam for the similarity index. The production impl is
/// [`QdrantIndex`]; tests substitute their own.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotent: creates the backing collection when absent, no-op when it
    /// already exists with a matching dimension.
    async fn ensure_collection(&self) -> Result<(), PipelineError>;

    /// Insert-or-replace by id.
    async fn upsert(&self, records: Vec<PatentRecord>) -> Result<(), PipelineError>;

    /// At most `top_k` matches, descending score, ties broken by ascending
    /// id. An empty result is not an error.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<PatentMatch>, PipelineError>;
}

/// Qdrant-backed index over the REST client. Initialization is lazy and
/// memoized: the first call runs `ensure_collection` exactly once, guarded
/// so concurrent first callers cannot race to create the collection twice.
pub struct QdrantIndex {
    client: QdrantClient,
    dimension: usize,
    init: OnceCell<()>,
}

impl QdrantIndex {
    pub fn new(client: QdrantClient, dimension: usize) -> Self {
        Self {
            client,
            dimension,
            init: OnceCell::new(),
        }
    }

    async fn ensure_ready(&self) -> Result<(), PipelineError> {
        self.init
            .get_or_try_init(|| self.ensure_collection_inner())
            .await?;
        Ok(())
    }

    async fn ensure_collection_inner(&self) -> Result<(), PipelineError> {
        let existing = self
            .client
            .collection_info()
            .await
            .map_err(|e| PipelineError::IndexUnavailable(e.to_string()))?;

        match existing {
            Some(params) => {
                if params.size != self.dimension {
                    return Err(PipelineError::DimensionMismatch {
                        expected: self.dimension,
                        actual: params.size,
                    });
                }
                debug!(
                    collection = self.client.collection(),
                    "collection already exists"
                );
                Ok(())
            }
            None => {
                info!(
                    collection = self.client.collection(),
                    dimension = self.dimension,
                    "creating collection"
                );
                self.client
                    .create_collection(self.dimension, DISTANCE)
                    .await
                    .map_err(|e| PipelineError::IndexUnavailable(e.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self) -> Result<(), PipelineError> {
        self.ensure_ready().await
    }

    async fn upsert(&self, records: Vec<PatentRecord>) -> Result<(), PipelineError> {
        self.ensure_ready().await?;
        let client = self.client.clone();
        upsert_in_batches(records, move |points| {
            let client = client.clone();
            async move { client.upsert(points).await }
        })
        .await
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<PatentMatch>, PipelineError> {
        self.ensure_ready().await?;
        let resp = self
            .client
            .search(vector.to_vec(), top_k as u64)
            .await
            .map_err(|e| PipelineError::IndexUnavailable(e.to_string()))?;

        let mut matches: Vec<PatentMatch> = resp
            .result
            .into_iter()
            .map(|hit| {
                let metadata = payload_to_metadata(hit.payload);
                let id = metadata
                    .get("publication_number")
                    .cloned()
                    .unwrap_or_else(|| id_to_string(&hit.id));
                PatentMatch {
                    id,
                    score: hit.score,
                    metadata,
                }
            })
            .collect();
        sort_matches(&mut matches);
        matches.truncate(top_k);
        Ok(matches)
    }
}

/// Maps records to points and sends them in `UPSERT_BATCH_SIZE` chunks; a
/// failing chunk reports its batch index.
async fn upsert_in_batches<F, Fut>(
    records: Vec<PatentRecord>,
    mut send: F,
) -> Result<(), PipelineError>
where
    F: FnMut(Vec<QdrantPoint>) -> Fut,
    Fut: std::future::Future<Output = Result<(), providers::ProviderError>>,
{
    for (batch_idx, points) in point_batches(records).into_iter().enumerate() {
        let count = points.len();
        send(points).await.map_err(|e| {
            PipelineError::IndexUnavailable(format!("upsert batch {} failed: {}", batch_idx, e))
        })?;
        debug!(batch = batch_idx, count, "upserted batch");
    }
    Ok(())
}

fn point_batches(records: Vec<PatentRecord>) -> Vec<Vec<QdrantPoint>> {
    records
        .chunks(UPSERT_BATCH_SIZE)
        .map(|batch| {
            batch
                .iter()
                .cloned()
                .map(|r| {
                    let mut payload: HashMap<String, serde_json::Value> = r
                        .metadata
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::String(v)))
                        .collect();
                    payload.insert(
                        "publication_number".to_string(),
                        serde_json::Value::String(r.id.clone()),
                    );
                    QdrantPoint {
                        id: r.id,
                        vector: r.vector,
                        payload,
                    }
                })
                .collect()
        })
        .collect()
}

/// Descending score, ascending id on equal scores. The backend already
/// returns rank order, but the tie-break keeps results deterministic.
pub fn sort_matches(matches: &mut [PatentMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn payload_to_metadata(payload: Option<serde_json::Value>) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    if let Some(serde_json::Value::Object(map)) = payload {
        for (k, v) in map {
            match v {
                serde_json::Value::String(s) => {
                    metadata.insert(k, s);
                }
                other => {
                    metadata.insert(k, other.to_string());
                }
            }
        }
    }
    metadata
}

fn id_to_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
