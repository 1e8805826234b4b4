//! Core library: embedding, prior-art retrieval, risk analysis, pipeline.

pub mod analyzer;
pub mod config;
pub mod context;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod prompts;
