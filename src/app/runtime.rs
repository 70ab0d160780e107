//! Run orchestration: resolve settings, resolve the record, download pages.

use anyhow::{Context, Result};
use antenati_core::{HttpClient, PortalClient, RecordDownloader};
use tracing::{debug, info};

use crate::app::config::{self, Settings};
use crate::app::dry_run::run_dry_run_preview;
use crate::app::progress_manager::ProgressManager;
use crate::cli::Args;

/// Runs one invocation end to end.
pub(crate) async fn run(args: Args) -> Result<()> {
    let file_config = config::load_default_file_config()?;
    let settings = config::resolve_settings(&args, file_config.as_ref());
    debug!(
        quality = %settings.quality,
        output_dir = %settings.output_dir.display(),
        manifest_base_url = %settings.manifest_base_url,
        "settings resolved"
    );

    let client = build_client(&settings)?;
    let portal = PortalClient::with_manifest_base_url(client.clone(), &settings.manifest_base_url);

    let archive = portal
        .fetch_archive(&args.url)
        .await
        .with_context(|| format!("Failed to resolve record at {}", args.url))?;

    println!("{}", archive.metadata.banner());

    let dest_dir = settings.output_dir.join(archive.metadata.relative_dir());
    let downloader = RecordDownloader::new(&client, settings.quality);

    if args.dry_run {
        return run_dry_run_preview(&downloader, &archive, &dest_dir, args.start_at).await;
    }

    let progress = ProgressManager::new(archive.image_urls.len());
    let result = downloader
        .download_all(&archive.image_urls, &dest_dir, args.start_at, &progress)
        .await;
    progress.finish();
    let stats = result.with_context(|| format!("Download stopped in {}", dest_dir.display()))?;

    info!(
        downloaded = stats.downloaded(),
        skipped = stats.skipped(),
        total = stats.total(),
        path = %dest_dir.display(),
        "Download complete"
    );
    Ok(())
}

fn build_client(settings: &Settings) -> Result<HttpClient> {
    HttpClient::with_timeouts(
        &settings.headers,
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    )
    .context("Failed to initialize HTTP client")
}
