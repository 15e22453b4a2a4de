//! Ingest a directory of text documents into the RAG tables for one tenant.
//!
//! ```text
//! rag-ingest --tenant 6f1c... ./docs --provider hash --json
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use brainops_api::{
    config,
    db,
    rag::{create_provider, IngestOptions, IngestReport, Ingestor},
};
use clap::Parser;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "rag-ingest", version, about = "Chunk, embed and store documents for retrieval")]
struct Cli {
    /// Tenant that will own the ingested documents
    #[arg(long)]
    tenant: Uuid,

    /// File or directory to ingest
    path: PathBuf,

    /// Embedding provider override (disabled, hash, openai)
    #[arg(long)]
    provider: Option<String>,

    /// Chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    overlap: Option<usize>,

    /// Comma-separated extensions to include, e.g. `md,txt`
    #[arg(long)]
    extensions: Option<String>,

    /// Run pending migrations before ingesting
    #[arg(long)]
    migrate: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(if cli.verbose { "debug" } else { "warn" }, cfg.log_json);

    if let Some(provider) = cli.provider {
        cfg.rag.embedding_provider = provider;
    }
    if let Some(size) = cli.chunk_size {
        cfg.rag.chunk_size = size;
    }
    if let Some(overlap) = cli.overlap {
        cfg.rag.chunk_overlap = overlap;
    }
    if let Some(extensions) = cli.extensions {
        cfg.rag.extensions = extensions;
    }

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    if cli.migrate || cfg.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed running migrations")?;
    }

    let embedder = create_provider(&cfg.rag)?;
    let ingestor = Ingestor::new(Arc::new(pool), embedder, IngestOptions::from(&cfg.rag))?;
    let report = ingestor.ingest_path(cli.tenant, &cli.path).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.files_ingested == 0 && report.files_unchanged == 0 && !report.errors.is_empty() {
        bail!("no files ingested, {} error(s)", report.errors.len());
    }
    Ok(())
}

fn print_summary(report: &IngestReport) {
    println!("files seen:      {}", report.files_seen);
    println!("files ingested:  {}", report.files_ingested);
    println!("files unchanged: {}", report.files_unchanged);
    println!("files skipped:   {}", report.files_skipped);
    println!("chunks written:  {}", report.chunks_written);
    for error in &report.errors {
        eprintln!("error: {}: {}", error.path, error.message);
    }
}
