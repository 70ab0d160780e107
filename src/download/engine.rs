//! Sequential page download loop.
//!
//! [`RecordDownloader`] walks the manifest's image URLs in order, numbering
//! pages from a start offset. A page whose file already exists is skipped
//! without touching the network, which makes reruns resume where an earlier
//! run stopped.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::client::HttpClient;
use super::error::DownloadError;
use super::filename::page_filename;
use super::quality::{Quality, apply_quality};

/// Result of processing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The image was fetched and written.
    Downloaded {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// The destination file already existed.
    Skipped,
}

/// Receives a callback after every processed page.
pub trait ProgressReporter {
    /// Called once per page, in order. `completed` counts pages processed so
    /// far including this one.
    fn page_finished(&self, page: u32, completed: usize, total: usize, outcome: &PageOutcome);
}

/// Progress reporter that ignores all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn page_finished(&self, _page: u32, _completed: usize, _total: usize, _outcome: &PageOutcome) {}
}

/// Totals for one download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    downloaded: usize,
    skipped: usize,
    bytes: u64,
}

impl DownloadStats {
    /// Pages fetched during this run.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Pages already present on disk.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Bytes written during this run.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Pages processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped
    }

    fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            PageOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// One planned page download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    /// Page number used in the file name.
    pub page_number: u32,
    /// Image URL with the quality size applied.
    pub image_url: String,
    /// Destination file.
    pub path: PathBuf,
    /// Whether the destination already exists (the page will be skipped).
    pub exists: bool,
}

/// Last page number for `pages` pages starting at `start_at`.
///
/// Returns `None` for an empty record.
///
/// # Errors
///
/// Returns [`DownloadError::PageRange`] when the numbering overflows `u32`.
pub fn last_page(start_at: u32, pages: usize) -> Result<Option<u32>, DownloadError> {
    if pages == 0 {
        return Ok(None);
    }
    u32::try_from(pages - 1)
        .ok()
        .and_then(|offset| start_at.checked_add(offset))
        .map(Some)
        .ok_or(DownloadError::PageRange {
            start: start_at,
            pages,
        })
}

/// Downloads the pages of one record at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct RecordDownloader<'a> {
    client: &'a HttpClient,
    quality: Quality,
}

impl<'a> RecordDownloader<'a> {
    /// Creates a downloader using `client` for every image request.
    #[must_use]
    pub fn new(client: &'a HttpClient, quality: Quality) -> Self {
        Self { client, quality }
    }

    /// Requested image quality.
    #[must_use]
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Downloads one page into `dest_dir` unless its file already exists.
    ///
    /// The file is named after `page_number`, zero-padded to the width of
    /// `last_page`. `dest_dir` is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] for filesystem failures, an image URL that
    /// cannot carry a size, and any transport failure.
    #[instrument(level = "debug", skip(self, source_url, dest_dir), fields(page = page_number))]
    pub async fn download_record(
        &self,
        source_url: &str,
        dest_dir: &Path,
        page_number: u32,
        last_page: u32,
    ) -> Result<PageOutcome, DownloadError> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| DownloadError::io(dest_dir.to_path_buf(), e))?;

        let path = dest_dir.join(page_filename(page_number, last_page));
        if file_exists(&path).await? {
            debug!(path = %path.display(), "page already on disk, skipping");
            return Ok(PageOutcome::Skipped);
        }

        let image_url = apply_quality(source_url, self.quality.pixels())?;
        let bytes = self.client.download_to_path(&image_url, &path).await?;
        Ok(PageOutcome::Downloaded { bytes })
    }

    /// Downloads every image in manifest order, numbering from `start_at`.
    ///
    /// Stops at the first failure; pages written before it stay on disk.
    ///
    /// # Errors
    ///
    /// Returns the first [`DownloadError`] encountered.
    pub async fn download_all(
        &self,
        image_urls: &[String],
        dest_dir: &Path,
        start_at: u32,
        progress: &dyn ProgressReporter,
    ) -> Result<DownloadStats, DownloadError> {
        let mut stats = DownloadStats::default();
        let Some(last) = last_page(start_at, image_urls.len())? else {
            info!("record has no pages");
            return Ok(stats);
        };

        let total = image_urls.len();
        let pages = (start_at..=last).zip(image_urls.iter().enumerate());
        for (page_number, (index, source_url)) in pages {
            let outcome = self
                .download_record(source_url, dest_dir, page_number, last)
                .await?;
            stats.record(outcome);
            progress.page_finished(page_number, index + 1, total, &outcome);
        }

        info!(
            downloaded = stats.downloaded(),
            skipped = stats.skipped(),
            bytes = stats.bytes(),
            "record complete"
        );
        Ok(stats)
    }

    /// Computes every page task without downloading anything.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] for page numbering overflow, image URLs that
    /// cannot carry a size, and filesystem errors while checking existence.
    pub async fn plan(
        &self,
        image_urls: &[String],
        dest_dir: &Path,
        start_at: u32,
    ) -> Result<Vec<PageTask>, DownloadError> {
        let Some(last) = last_page(start_at, image_urls.len())? else {
            return Ok(Vec::new());
        };

        let mut tasks = Vec::with_capacity(image_urls.len());
        for (page_number, source_url) in (start_at..=last).zip(image_urls) {
            let path = dest_dir.join(page_filename(page_number, last));
            tasks.push(PageTask {
                page_number,
                image_url: apply_quality(source_url, self.quality.pixels())?,
                exists: file_exists(&path).await?,
                path,
            });
        }
        Ok(tasks)
    }
}

async fn file_exists(path: &Path) -> Result<bool, DownloadError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))
}
