use crate::context;
use crate::error::PipelineError;
use crate::models::{AnalysisResult, PatentMatch, RiskLevel};
use crate::prompts::{FALLBACK_RECOMMENDATION, SYSTEM_PROMPT};
use providers::{ChatProvider, ChatRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// When the model output defeats parsing entirely, the ids of this many
/// top-ranked matches are reported as the conflicting patents.
const FALLBACK_CONFLICT_COUNT: usize = 3;

#[derive(Deserialize)]
struct RawAnalysis {
    risk_level: String,
    analysis: String,
    #[serde(default)]
    conflicting_patents: Vec<String>,
    #[serde(default)]
    recommendations: String,
}

/// Invokes the generative model with the assembled prior-art prompt and
/// normalizes its output into an [`AnalysisResult`].
#[derive(Clone)]
pub struct RiskAnalyzer {
    chat: Arc<dyn ChatProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl RiskAnalyzer {
    pub fn new(chat: Arc<dyn ChatProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            chat,
            temperature,
            max_tokens,
        }
    }

    /// Errors only when the model call itself fails. Malformed output is
    /// degraded into a best-effort result instead: an imperfect structured
    /// answer beats a hard failure for an interactive tool.
    pub async fn analyze(
        &self,
        query: &str,
        matches: &[PatentMatch],
    ) -> Result<AnalysisResult, PipelineError> {
        let prompt = context::assemble(query, matches);
        let req = ChatRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let raw = self
            .chat
            .chat(&req)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;
        debug!(preview = %raw.chars().take(200).collect::<String>(), "raw model output");

        Ok(normalize_response(&raw, matches))
    }
}

/// Fence-strips and parses the model output; falls back to a degraded
/// result when parsing fails, and coerces an out-of-enum risk_level to
/// Medium while keeping the other parsed fields.
fn normalize_response(raw: &str, matches: &[PatentMatch]) -> AnalysisResult {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<RawAnalysis>(cleaned) {
        Ok(parsed) => {
            let risk_level = match RiskLevel::from_exact(&parsed.risk_level) {
                Some(level) => level,
                None => {
                    warn!(value = %parsed.risk_level, "risk_level outside schema, coercing to Medium");
                    RiskLevel::Medium
                }
            };
            AnalysisResult {
                risk_level,
                analysis: parsed.analysis,
                conflicting_patents: parsed.conflicting_patents,
                recommendations: parsed.recommendations,
            }
        }
        Err(e) => {
            warn!(error = %e, "model output was not valid JSON, returning degraded result");
            AnalysisResult {
                risk_level: RiskLevel::Medium,
                analysis: cleaned.to_string(),
                conflicting_patents: matches
                    .iter()
                    .take(FALLBACK_CONFLICT_COUNT)
                    .map(|m| m.id.clone())
                    .collect(),
                recommendations: FALLBACK_RECOMMENDATION.to_string(),
            }
        }
    }
}

/// The prompt forbids markdown fences, but models wrap output anyway.
/// Strips a leading ```json / ``` and a trailing ``` before parsing.
fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}
