mod cmd;
mod output;
mod source;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "copy-guides",
    about = "Copy architecture guides into a target repository's guides/ directory",
    version
)]
struct Cli {
    /// Absolute path of the target repository
    target: PathBuf,

    /// Guide source root (default: auto-detect from GUIDES-README.md or guides.yaml)
    #[arg(long, short = 's', env = "GUIDES_SOURCE")]
    source: Option<PathBuf>,

    /// Output the sync report as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Show what would be copied without changing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cmd::sync::run(&cli.target, cli.source.as_deref(), cli.json, cli.dry_run);

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
