use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use browse_core::{
    config::try_load_settings_from, load_settings, ArtworkWriter, BrowseDeps, ListController,
    LocalProviderHost, TracingAnalyticsSink,
};
use clap::Parser;
use shared::domain::ProviderRef;
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod catalog;
mod terminal;

use catalog::Catalog;
use terminal::{ExitNavigator, TerminalSurface};

/// Browse one provider's artwork, optionally refresh it and pick a wallpaper.
#[derive(Parser, Debug)]
struct Args {
    /// JSON catalog of providers to host in-process.
    #[arg(long)]
    catalog: PathBuf,
    /// Provider content URI, e.g. content://com.example.featured/artwork.
    #[arg(long)]
    provider: String,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    refresh_delay_ms: Option<u64>,
    /// Ask the provider for more artwork once the list is shown.
    #[arg(long)]
    refresh: bool,
    /// Position of the artwork to set as wallpaper.
    #[arg(long)]
    select: Option<usize>,
    /// How long to keep the screen open after the last action.
    #[arg(long, default_value_t = 200)]
    linger_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => try_load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(url) = &args.database_url {
        settings.database_url = url.clone();
    }
    if let Some(delay) = args.refresh_delay_ms {
        settings.refresh_delay_ms = delay;
    }
    settings.validate()?;

    let provider = ProviderRef::parse(&args.provider)?;
    let storage = Storage::new(&settings.database_url)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.database_url))?;
    storage.health_check().await?;

    let host = Arc::new(LocalProviderHost::new());
    Catalog::load(&args.catalog)?.install(&host).await?;

    let deps = BrowseDeps::local(
        host,
        Arc::new(storage.clone()) as Arc<dyn ArtworkWriter>,
        Arc::new(TracingAnalyticsSink),
        Arc::new(ExitNavigator),
    );
    let linger = Duration::from_millis(args.linger_ms);
    let refresh_wait = settings.refresh_delay() + linger;
    let controller = ListController::new(deps, Arc::new(TerminalSurface::stdout()), settings);

    let descriptor = controller.open(provider).await?;
    info!(authority = %descriptor.authority, label = %descriptor.label, "browsing provider");
    tokio::time::sleep(linger).await;

    if args.refresh {
        controller.refresh()?;
        tokio::time::sleep(refresh_wait).await;
    }

    if let Some(index) = args.select {
        controller.select_at(index)?;
        tokio::time::sleep(linger).await;
    }

    let shown = controller.rendered().len();
    controller.destroy();
    info!(shown, "artwork list closed");

    match storage.current_artwork().await? {
        Some(active) => println!(
            "active wallpaper: {} ({})",
            active.artwork.display_title().unwrap_or("untitled"),
            active.artwork.image_uri
        ),
        None => println!("no wallpaper selected yet"),
    }

    Ok(())
}
