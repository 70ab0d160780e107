//! Dry-run flow: show the planned page files without downloading.

use std::path::Path;

use anyhow::{Context, Result};
use antenati_core::{Archive, RecordDownloader};

pub(crate) async fn run_dry_run_preview(
    downloader: &RecordDownloader<'_>,
    archive: &Archive,
    dest_dir: &Path,
    start_at: u32,
) -> Result<()> {
    let tasks = downloader
        .plan(&archive.image_urls, dest_dir, start_at)
        .await
        .context("Failed to plan page downloads")?;

    println!(
        "Dry run preview: {} page(s) into {} at quality {}.",
        tasks.len(),
        dest_dir.display(),
        downloader.quality()
    );

    let mut present = 0usize;
    for task in &tasks {
        if task.exists {
            present += 1;
            println!("- [present] {}", task.path.display());
        } else {
            println!("- [fetch] {} <- {}", task.path.display(), task.image_url);
        }
    }

    println!(
        "Dry run summary: {} to fetch, {} already present.",
        tasks.len() - present,
        present
    );
    println!("Dry run - no files downloaded");
    Ok(())
}
