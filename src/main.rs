use photodeck::scan::{scan_single, walk_tree, WalkOptions};
use photodeck::server::HttpServer;
use photodeck::Config;
use anyhow::Result;
use log::LevelFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logger first; without RUST_LOG the level is narrowed once the config is read
    let rust_log = std::env::var("RUST_LOG").is_ok();
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "trace")
    ).init();
    if !rust_log {
        log::set_max_level(LevelFilter::Info);
    }

    let config = Config::load()?;
    if !rust_log {
        apply_log_level(&config.library.log_level);
    }

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "check" => {
            run_check(&config)?;
        }
        "serve" => {
            run_http_server(config).await?;
        }
        other => {
            anyhow::bail!("Unknown command: {} (expected 'serve' or 'check')", other);
        }
    }

    Ok(())
}

/// Narrow logging to the configured `log_level`
fn apply_log_level(level: &str) {
    match level.parse::<LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("Unknown log_level {:?}, keeping info", level),
    }
}

/// Run the HTTP server
async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting Photodeck v{}", env!("CARGO_PKG_VERSION"));

    let server = HttpServer::new(&config)?;
    server.run().await?;

    Ok(())
}

/// Verify both roots can be listed and report what a full scan would see
fn run_check(config: &Config) -> Result<()> {
    log::info!("Photodeck v{} configuration check", env!("CARGO_PKG_VERSION"));
    log::info!("Media root: {}", config.media_root().display());
    log::info!("Metadata root: {}", config.metadata_root().display());
    log::info!("Public URL: {}", config.public_url());
    log::info!("Collision policy: {:?}", config.scan.collision_policy);

    let top = scan_single(config.media_root())?;
    log::info!(
        "✓ Media root readable: {} media files, {} folders at top level",
        top.files.len(),
        top.folders.len()
    );

    let options = WalkOptions::collect().with_follow_links(config.scan.follow_links);
    for (name, root) in [("media", config.media_root()), ("metadata", config.metadata_root())] {
        let report = walk_tree(root, options, |_| {})?;
        if report.skipped.is_empty() {
            log::info!("✓ {} tree: {} files, nothing skipped", name, report.files_visited);
        } else {
            log::warn!(
                "{} tree: {} files, {} paths unreadable",
                name,
                report.files_visited,
                report.skipped.len()
            );
            for skipped in &report.skipped {
                log::warn!("  skipped {}: {}", skipped.path.display(), skipped.reason);
            }
        }
    }

    let library = photodeck::Library::from_config(config)?;
    let records = library.list_all("")?;
    let with_metadata = records.iter().filter(|r| r.metadata.is_some()).count();
    log::info!(
        "✓ Full listing: {} media files, {} with metadata",
        records.len(),
        with_metadata
    );

    Ok(())
}
