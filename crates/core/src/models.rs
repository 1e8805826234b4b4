use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A patent stored in the similarity index: created by ingestion, immutable
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatentRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

/// One ranked hit from a similarity query. Request-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatentMatch {
    pub id: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

impl PatentMatch {
    pub fn title(&self) -> &str {
        self.metadata.get("title").map(String::as_str).unwrap_or("N/A")
    }

    pub fn abstract_text(&self) -> &str {
        self.metadata
            .get("abstract")
            .map(String::as_str)
            .unwrap_or("N/A")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Strict, case-sensitive parse. Anything but the three exact schema
    /// strings is `None`; callers decide the fallback.
    pub fn from_exact(s: &str) -> Option<Self> {
        match s {
            "High" => Some(RiskLevel::High),
            "Medium" => Some(RiskLevel::Medium),
            "Low" => Some(RiskLevel::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_level: RiskLevel,
    pub analysis: String,
    pub conflicting_patents: Vec<String>,
    pub recommendations: String,
}

/// Full pipeline output: the analysis plus the raw retrieved matches so the
/// caller can show the evidence, not just the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub risk_level: RiskLevel,
    pub analysis: String,
    pub conflicting_patents: Vec<String>,
    pub recommendations: String,
    pub retrieved_matches: Vec<PatentMatch>,
}

/// A raw row from the bulk patent export consumed by ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkPatent {
    pub publication_number: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub claims: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
}
