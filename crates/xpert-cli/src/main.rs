//! xpert: batch identity resolution of provider profiles.
//!
//! Reads provider person records from JSON files, resolves each against the
//! owner's meta-experts, and prints one JSON line per profile followed by a
//! summary on stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xpert_core::{MetaExpertStore, SpendRecorder};
use xpert_inference::{GatewayConfig, InferenceSettings, LlmGateway, OpenAIBackend};
use xpert_resolve::{EntityResolver, IngestOutcome, IngestPipeline, ProviderProfile, ResolverConfig};
use xpert_store::{HttpStore, MemoryStore};

#[derive(Parser)]
#[command(name = "xpert")]
#[command(author, version, about = "Expert identity resolution and enrichment")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve provider profiles into meta-experts
    Resolve {
        /// Owner key scoping reads and writes (the sourcing user)
        #[arg(short, long, env = "XPERT_OWNER")]
        owner: String,

        /// Organization scope for candidate matching
        #[arg(long, env = "XPERT_ORGANIZATION_ID")]
        organization: Option<String>,

        /// Use an in-memory store instead of the backend API
        #[arg(long)]
        dry_run: bool,

        /// Profile JSON files (one object or an array of objects each)
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let _file_guard = init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            owner,
            organization,
            dry_run,
            files,
        } => resolve(&owner, organization, dry_run, &files).await,
    }
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "xpert=info")
///
/// Logs go to stderr so stdout carries only result lines.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "xpert=info,xpert_core=info,xpert_inference=info,xpert_store=info,xpert_resolve=info"
            .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let guard = if let Some(ref path) = log_file {
        let file_dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let file_name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("xpert.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

/// Read every profile from the given files, in order.
fn load_profiles(files: &[PathBuf]) -> anyhow::Result<Vec<(PathBuf, ProviderProfile)>> {
    let mut profiles = Vec::new();
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: JsonValue = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;

        let records = match value {
            JsonValue::Array(items) => items,
            other => vec![other],
        };
        for record in records {
            let profile: ProviderProfile = serde_json::from_value(record)
                .with_context(|| format!("{} contains an invalid profile", path.display()))?;
            profiles.push((path.clone(), profile));
        }
    }
    Ok(profiles)
}

async fn resolve(
    owner: &str,
    organization: Option<String>,
    dry_run: bool,
    files: &[PathBuf],
) -> anyhow::Result<ExitCode> {
    let profiles = load_profiles(files)?;
    info!(profiles = profiles.len(), dry_run, "Loaded provider profiles");

    let (store, spend): (Arc<dyn MetaExpertStore>, Arc<dyn SpendRecorder>) = if dry_run {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn MetaExpertStore> = memory.clone();
        (store, memory)
    } else {
        let http = Arc::new(HttpStore::from_env().context("Failed to configure backend store")?);
        let store: Arc<dyn MetaExpertStore> = http.clone();
        (store, http)
    };

    let backend = OpenAIBackend::from_env().context("Failed to configure model backend")?;
    let gateway =
        LlmGateway::new(Arc::new(backend), GatewayConfig::from_env()).with_spend_recorder(spend);
    let resolver = EntityResolver::with_gateway(
        store,
        gateway.clone(),
        InferenceSettings::from_env(),
        ResolverConfig::from_env(),
    );

    let mut pipeline = IngestPipeline::new(resolver);
    if let Some(org) = organization {
        pipeline = pipeline.with_organization_id(org);
    }

    let (sources, profiles): (Vec<PathBuf>, Vec<ProviderProfile>) = profiles.into_iter().unzip();
    let results = pipeline.ingest_batch(owner, profiles).await;
    gateway.flush().await;

    let mut created = 0;
    let mut merged = 0;
    let mut failed = 0;
    for (source, result) in sources.iter().zip(&results) {
        let line = match result {
            Ok(outcome) => {
                if outcome.resolution.was_new {
                    created += 1;
                } else {
                    merged += 1;
                }
                outcome_line(source, outcome)
            }
            Err(e) => {
                failed += 1;
                json!({
                    "file": source.display().to_string(),
                    "status": "error",
                    "error": e.to_string(),
                })
            }
        };
        println!("{}", line);
    }

    eprintln!(
        "Processed {} profiles: {} created, {} merged, {} failed",
        results.len(),
        created,
        merged,
        failed
    );

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn outcome_line(source: &Path, outcome: &IngestOutcome) -> JsonValue {
    let resolution = &outcome.resolution;
    json!({
        "file": source.display().to_string(),
        "status": "ok",
        "expertId": outcome.expert.id,
        "name": outcome.expert.name,
        "metaExpertId": resolution.meta_expert.id,
        "wasNew": resolution.was_new,
        "matchedBy": resolution.matched_by,
        "tags": resolution.tags.iter().map(|t| t.tag.as_str()).collect::<Vec<_>>(),
    })
}
