//! Tag Graph Binary
//!
//! Extracts the tag graph of a content archive, merges data packs on top,
//! and prints the result as JSON on stdout. Logs go to stderr.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `TAG_GRAPH_BATCH_SIZE`: Entries parsed per extraction batch (default: 100)
//! - `TAG_GRAPH_PALETTE`: Comma-separated pack colours
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin tag_graph -- client.jar my_pack.zip other_pack.zip --export
//! ```
//!
//! Without `--export` only stats, categories and pack summaries are printed.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use tag_graph_kernel::{CancellationFlag, GraphConfig, Session};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tag_graph=info,tag_graph_kernel=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true)
            )
            .init();
    }
}

/// Inspect the tag graph of a content archive with data packs merged on top.
#[derive(Parser)]
#[command(name = "tag_graph", version, about)]
struct Args {
    /// Content archive (client jar) to extract the base graph from
    base: PathBuf,

    /// Data pack archives, merged in the order given
    overlays: Vec<PathBuf>,

    /// Print the whole graph export instead of a summary
    #[arg(long)]
    export: bool,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let config = GraphConfig::from_env()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        batch_size = config.batch_size,
        params_hash = %config.params_hash(),
        "Starting tag graph"
    );

    let cancel = CancellationFlag::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling extraction");
            on_ctrl_c.cancel();
        }
    });

    let mut session = Session::new(config);

    let start = Instant::now();
    let bytes = tokio::fs::read(&args.base).await?;
    let report = session
        .load_base_bytes(
            bytes,
            |progress| info!(percent = progress.percent, "{}", progress.message),
            Some(&cancel),
        )
        .await?;
    info!(
        entries = report.entries_total,
        parsed = report.entries_parsed,
        errors = report.errors.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Base graph extracted"
    );

    for path in &args.overlays {
        let bytes = tokio::fs::read(path).await?;
        let outcome = session.upload(bytes, &file_name(path)).await?;
        for pack in outcome.packs() {
            if let Some(error) = &pack.error {
                warn!(pack = %pack.name, error = %error, "Data pack failed to load");
                continue;
            }
            if let Some(warning) = session.pack_warning(&pack.id)? {
                warn!(pack = %pack.name, title = %warning.title, "{}", warning.body);
            }
        }
    }

    let output = if args.export {
        serde_json::to_value(session.export())?
    } else {
        let working = session.working_graph();
        let packs: Vec<_> = session
            .overlays()
            .list_all()
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "color": p.color,
                    "enabled": p.enabled,
                    "definitions": p.num_definitions(),
                    "packFormat": p.pack_format,
                    "error": p.error,
                })
            })
            .collect();
        json!({
            "stats": working.stats(),
            "categories": working.categories(),
            "packFormat": working.pack_format(),
            "fingerprint": working.fingerprint(),
            "packs": packs,
        })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_base_overlays_and_export() {
        let args = Args::try_parse_from(["tag_graph", "client.jar", "a.zip", "--export", "b.zip"]).unwrap();
        assert_eq!(args.base, PathBuf::from("client.jar"));
        assert_eq!(args.overlays, vec![PathBuf::from("a.zip"), PathBuf::from("b.zip")]);
        assert!(args.export);
    }

    #[test]
    fn test_help_and_missing_base() {
        let help = Args::try_parse_from(["tag_graph", "--help"]).err().unwrap();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let missing = Args::try_parse_from(["tag_graph"]).err().unwrap();
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("packs/My Pack.zip")), "My Pack.zip");
    }
}
