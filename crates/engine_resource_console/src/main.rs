//! # resource_console
//!
//! Loads a JSON schema and a JSON resource file into a resource set and
//! answers one query against it, printing each match as a JSON line.
//!
//! ```text
//! resource_console --schema monsters.schema.json --resources monsters.json \
//!     --limit 10 intersect level 4
//! ```
//!
//! Set `ENGINE_RESOURCE_PARTITIONS` to tune the interval grid and `RUST_LOG`
//! for diagnostics.

mod command;
mod loader;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_resource::ResourceSetConfig;

use command::Command;

#[derive(Debug, Parser)]
#[command(name = "resource_console", about = "Query indexed resources loaded from JSON")]
struct Args {
    /// Path to the JSON schema declaring the indices
    #[arg(short, long)]
    schema: PathBuf,

    /// Path to the JSON array of resources
    #[arg(short, long)]
    resources: PathBuf,

    /// Maximum number of matches to print
    #[arg(short, long, default_value_t = 32)]
    limit: usize,

    /// Number of leading matches to skip
    #[arg(short, long, default_value_t = 0)]
    offset: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ResourceSetConfig::from_env();

    info!(
        schema = %args.schema.display(),
        resources = %args.resources.display(),
        partitions = config.interval_partitions,
        "loading resources"
    );
    let set = loader::load_set(&args.schema, &args.resources, &config)?;

    let query = args.command.to_query();
    let mut out = vec![None; args.limit];
    let found = set.fill_query(&query, &mut out, args.offset);
    info!(?query, found, "query complete");

    for resource in out.iter().flatten() {
        println!("{}", serde_json::to_string(resource)?);
    }
    Ok(())
}
