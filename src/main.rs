use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::debug;

use schema_refresh::config::schema::{load_config, load_default_config, RefreshConfig};
use schema_refresh::logging::init_logging;
use schema_refresh::manager::{MetadataManager, RefreshScope, RowSource, RowSourceError};
use schema_refresh::rows::{SchemaRows, SchemaRowsBuilder};

#[derive(Debug, Parser)]
#[clap(name = "schema-refresh", version, about = "Inspect schema metadata refreshes")]
struct Args {
    /// Path to the TOML configuration file
    #[clap(short = 'c', long = "config", global = true)]
    config_path: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the schema change events between two JSON row dumps, one per line
    Diff { old: PathBuf, new: PathBuf },
}

// Serves each dump once, in order, as if the schema had changed between two fetches
struct DumpRowSource {
    dumps: Mutex<VecDeque<SchemaRowsBuilder>>,
}

#[async_trait]
impl RowSource for DumpRowSource {
    async fn fetch_rows(&self, scope: &RefreshScope) -> Result<SchemaRows, RowSourceError> {
        let dump = self
            .dumps
            .lock()
            .pop_front()
            .ok_or_else(|| RowSourceError::new("no more dumps to read"))?;
        debug!("Serving {scope:?} from dump");

        dump.build()
            .map_err(|e| RowSourceError::with_source("invalid dump", e))
    }
}

fn read_dump(path: &Path) -> Result<SchemaRowsBuilder, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

async fn diff(config: RefreshConfig, old: &Path, new: &Path) -> Result<Vec<String>, String> {
    let source = DumpRowSource {
        dumps: Mutex::new(VecDeque::from([read_dump(old)?, read_dump(new)?])),
    };
    let manager = MetadataManager::new(Arc::new(source), config.schema, config.log_prefix);

    manager
        .refresh_full()
        .await
        .map_err(|e| format!("{}: {e}", old.display()))?;
    let events = manager
        .refresh_full()
        .await
        .map_err(|e| format!("{}: {e}", new.display()))?;

    Ok(events.iter().map(ToString::to_string).collect())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config_path {
        Some(path) => load_config(path),
        None => load_default_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    match args.command {
        Command::Diff { old, new } => match diff(config, &old, &new).await {
            Ok(events) => {
                for event in events {
                    println!("{event}");
                }
                ExitCode::SUCCESS
            }
            Err(message) => {
                eprintln!("Error: {message}");
                ExitCode::FAILURE
            }
        },
    }
}
