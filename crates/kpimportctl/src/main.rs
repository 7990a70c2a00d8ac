use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kpimportctl::cmd_convert;
use kpimportctl::cmd_stats;

#[derive(Parser, Debug)]
#[command(name = "kpimportctl", version, about = "KeePass 2.x XML import CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Import an XML export and print the resulting archive
    Convert {
        file: PathBuf,
        /// Print passwords instead of masking them
        #[arg(long)]
        show_passwords: bool,
    },
    /// Print group and entry totals for an XML export
    Stats { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { verbose, json, cmd } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Convert {
            file,
            show_passwords,
        } => cmd_convert::run(&file, show_passwords, json).await?,
        Cmd::Stats { file } => cmd_stats::run(&file, json).await?,
    };

    Ok(())
}
