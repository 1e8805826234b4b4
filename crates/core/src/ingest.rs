use crate::embeddings::Encoder;
use crate::index::VectorIndex;
use crate::models::{BulkPatent, PatentRecord};
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Loads bulk patent rows from a JSONL export and upserts them into the
/// index. Must run with the same encoder configuration as the query path,
/// or similarity scores against stored vectors are meaningless.
pub async fn run_ingest(
    path: &Path,
    encoder: &Encoder,
    index: &dyn VectorIndex,
    batch_size: usize,
) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading bulk export {}", path.display()))?;

    let mut patents = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let patent: BulkPatent = serde_json::from_str(line)
            .with_context(|| format!("parsing line {} of {}", line_no + 1, path.display()))?;
        if patent.abstract_text.trim().is_empty() {
            warn!(id = %patent.publication_number, "skipping patent without abstract");
            continue;
        }
        patents.push(patent);
    }
    info!(count = patents.len(), "loaded patents from bulk export");

    index.ensure_collection().await?;

    let mut ingested = 0usize;
    for batch in patents.chunks(batch_size) {
        let texts: Vec<String> = batch
            .iter()
            .map(|p| format!("{}\n\n{}", p.title, p.abstract_text))
            .collect();
        let vectors = encoder.encode_many(&texts).await?;

        let records: Vec<PatentRecord> = batch
            .iter()
            .zip(vectors)
            .map(|(patent, vector)| {
                let mut metadata = HashMap::new();
                metadata.insert("title".to_string(), patent.title.clone());
                metadata.insert("abstract".to_string(), patent.abstract_text.clone());
                if let Some(date) = &patent.publication_date {
                    metadata.insert("publication_date".to_string(), date.clone());
                }
                PatentRecord {
                    id: patent.publication_number.clone(),
                    vector,
                    metadata,
                }
            })
            .collect();

        index.upsert(records).await?;
        ingested += batch.len();
        info!(ingested, "upserted batch");
    }

    Ok(ingested)
}
