use thiserror::Error;

/// Error taxonomy for the analysis pipeline. Every internal step returns one
/// of these unchanged; the orchestrator (and ultimately the CLI) is the
/// single point where they become caller-visible status. No step retries
/// internally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller-supplied text failed validation. User-correctable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding backend failed or produced an unusable response.
    #[error("embedding failed: {0}")]
    Encoding(String),

    /// The vector index is unreachable or a call against it failed.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    /// An existing collection was created with a different vector width
    /// than the encoder produces.
    #[error("index dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The query succeeded but the index holds no records at all. A setup
    /// problem, not a genuine "no similar prior art" finding.
    #[error("no prior art found; the index has not been populated")]
    NoPriorArt,

    /// The generative-model call itself failed (network/auth/quota).
    /// Malformed model output is never an error; see the analyzer fallback.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Startup configuration was invalid.
    #[error("configuration error: {0}")]
    Config(String),
}
