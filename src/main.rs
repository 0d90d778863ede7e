mod fetch;
mod input;
mod single_config;
mod sub_convert;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
  /// Emit trace-level logs on stderr.
  #[arg(short, long, global = true, default_value_t = false)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Convert share-links (and optionally subscription URLs) into one load-balanced xray JSON config.
  Convert(sub_convert::Args),

  /// Emit a standalone xray JSON config per share-link (stdout JSONL).
  Single(single_config::Args),
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
  let cli = Cli::parse();
  let level = if cli.verbose {
    LevelFilter::TRACE
  } else {
    LevelFilter::INFO
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
    .with_writer(std::io::stderr)
    .init();

  if let Err(e) = run(cli).await {
    tracing::error!("Error: {:#}", e);
    std::process::exit(1);
  }
}

async fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Convert(args) => sub_convert::run(args).await,
    Commands::Single(args) => single_config::run(args).await,
  }
}
