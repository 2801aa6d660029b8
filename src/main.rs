mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use smartcatalog::config::Config;
use smartcatalog::session::SyncController;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    info!(base_url = %config.service.base_url, "Configuration loaded");

    let controller = SyncController::from_config(&config)?;

    let failed = match cli.command {
        Commands::Catalog => controller.fetch_initial().await.is_err(),
        Commands::Upload(args) => {
            let (fetched, uploaded) = tokio::join!(controller.fetch_initial(), async {
                controller.select_paths(&args.files).await?;
                controller.submit().await.map_err(BoxError::from)
            });
            if let Err(e) = &fetched {
                warn!(error = %e, "Initial fetch failed");
            }
            uploaded.is_err()
        }
    };

    let view = controller.view().await;
    controller.teardown().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", cli::render(&view));
    }

    if failed {
        std::process::exit(1);
    }

    Ok(())
}
