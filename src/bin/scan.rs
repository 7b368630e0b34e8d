//! Print a library listing as JSON without starting the server.

use clap::Parser;
use photodeck::{Config, Library};
use std::io::Write;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "scan")]
#[command(about = "List media files with their sidecar metadata as JSON")]
struct Args {
    /// Subdirectory of the media root to list
    #[arg(default_value = "")]
    target: String,

    /// Only list the files and folders directly inside the target
    #[arg(short, long)]
    shallow: bool,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "warn"),
    )
    .init();

    let args = Args::parse();

    let config = Config::load()?;
    let library = Library::from_config(&config)?;
    log::info!("Media root: {}", library.media_root().display());

    let value = if args.shallow {
        serde_json::to_value(library.scan_single(&args.target)?)?
    } else {
        serde_json::to_value(library.list_all(&args.target)?)?
    };

    let mut out = std::io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &value)?;
    } else {
        serde_json::to_writer(&mut out, &value)?;
    }
    writeln!(out)?;
    Ok(())
}
