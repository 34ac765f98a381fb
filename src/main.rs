//! synth-source CLI
//!
//! Pulls synthetic change records from a configured source and prints them
//! as JSON lines. Logs go to stderr and are filtered with `RUST_LOG`.
//!
//! ```bash
//! # Stream records until Ctrl+C (or until `record_count` is reached)
//! synth-source run --config source.yaml
//!
//! # Reproducible run of 100 records
//! synth-source run --config source.yaml --seed 42 --record-count 100
//!
//! # Check a configuration and print the resolved collections
//! synth-source validate --config source.yaml
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use synth_source::output::record_to_json;
use synth_source::{Config, Source};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "synth-source")]
#[command(about = "Generate synthetic change records at a controlled pace")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull records and print them to stdout as JSON lines
    Run {
        /// Path to the YAML configuration
        #[arg(long, value_name = "PATH", env = "SYNTH_SOURCE_CONFIG")]
        config: PathBuf,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured record count (0 = unlimited)
        #[arg(long)]
        record_count: Option<u64>,
    },

    /// Validate a configuration and exit
    Validate {
        /// Path to the YAML configuration
        #[arg(long, value_name = "PATH", env = "SYNTH_SOURCE_CONFIG")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Logs go to stderr, records to stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            record_count,
        } => {
            let mut config = load_config(&config)?;
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(record_count) = record_count {
                config.record_count = record_count;
            }
            run_source(config).await
        }
        Commands::Validate { config: path } => {
            let config = load_config(&path)?;
            config
                .validate()
                .with_context(|| format!("Invalid configuration in {path:?}"))?;
            print_summary(&config);
            println!("{path:?} is valid");
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::from_file(path).with_context(|| format!("Failed to load configuration from {path:?}"))
}

fn print_summary(config: &Config) {
    for (name, collection) in config.collection_configs() {
        let name = if name.is_empty() { "<default>" } else { &name };
        let operations: Vec<&str> = collection.operations.iter().map(|op| op.as_str()).collect();
        println!(
            "collection {name}: {:?} format, operations [{}]",
            collection.format.format_type,
            operations.join(", ")
        );
    }

    let rate = config.rate_limit();
    if rate > 0.0 {
        println!("rate: {rate} records/s");
    } else {
        println!("rate: unlimited");
    }
    if config.burst.is_enabled() {
        println!(
            "burst: sleep {:?}, generate {:?}",
            config.burst.sleep_time, config.burst.generate_time
        );
    } else {
        println!("burst: disabled");
    }
}

async fn run_source(config: Config) -> anyhow::Result<()> {
    let record_count = config.record_count;
    let mut source = Source::build(config).context("Failed to build source")?;
    let cancel = setup_shutdown_handler();

    let stdout = std::io::stdout();
    loop {
        // A bounded run ends once every record is out instead of blocking.
        if record_count > 0 && source.is_exhausted() {
            info!("Produced all {} records", record_count);
            break;
        }

        let record = match source.pull(&cancel).await {
            Ok(record) => record,
            Err(e) if e.is_cancelled() => break,
            Err(e) => return Err(e.into()),
        };

        let line = serde_json::to_string(&record_to_json(&record)?)?;
        let mut out = stdout.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        source.ack(&record.position);
    }

    let metrics = source.metrics();
    info!(
        "Source stopped: {} records, {:?} in burst sleep, {:?} rate limited",
        metrics.records_produced, metrics.burst_wait, metrics.rate_limit_wait
    );
    Ok(())
}

fn setup_shutdown_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt signal (Ctrl+C)");
            trigger.cancel();
        }
    });

    cancel
}
