use anyhow::Result;
use clap::{Parser, Subcommand};
use patentguard_core::config;
use patentguard_core::embeddings::Encoder;
use patentguard_core::ingest;
use patentguard_core::models::PipelineResult;
use patentguard_core::pipeline::{build_index, build_pipeline, build_registry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "patentguard", about = "Prior-art search and risk analysis")]
struct Cli {
    /// Path to a config file (defaults to config/default.toml).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an invention idea against the indexed prior art.
    Analyze {
        /// The invention description (at least 10 characters).
        idea: String,
        /// Emit the full result as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
    /// Load a JSONL bulk patent export into the index.
    Ingest {
        /// Path to the JSONL file; one patent object per line.
        file: PathBuf,
        /// Embedding batch size override.
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Create the index collection if it does not exist yet.
    InitIndex,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { idea, json } => {
            let pipeline = build_pipeline(&cfg)?;
            let result = pipeline.run(&idea).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            Ok(())
        }
        Commands::Ingest { file, batch_size } => {
            let registry = build_registry(&cfg);
            let embedding = registry
                .embedding(None)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            let encoder = Encoder::new(embedding, cfg.embeddings.dimension);
            let index = build_index(&cfg, encoder.dimension())?;
            let batch = batch_size.unwrap_or(cfg.embeddings.batch_size);
            let count = ingest::run_ingest(&file, &encoder, index.as_ref(), batch).await?;
            println!("Ingested {} patents into '{}'.", count, cfg.vectors.collection);
            Ok(())
        }
        Commands::InitIndex => {
            let index = build_index(&cfg, cfg.embeddings.dimension)?;
            index.ensure_collection().await?;
            println!("Collection '{}' is ready.", cfg.vectors.collection);
            Ok(())
        }
    }
}

fn print_result(result: &PipelineResult) {
    println!("Risk level: {}", result.risk_level);
    println!();
    println!("{}", result.analysis);
    println!();
    if result.conflicting_patents.is_empty() {
        println!("Conflicting patents: none identified");
    } else {
        println!("Conflicting patents:");
        for id in &result.conflicting_patents {
            println!("  - {}", id);
        }
    }
    println!();
    println!("Recommendations: {}", result.recommendations);
    println!();
    println!("Retrieved prior art:");
    for m in &result.retrieved_matches {
        println!("  {:.3}  {}  {}", m.score, m.id, m.title());
    }
}
