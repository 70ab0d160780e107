//! HTTP client and page download loop.
//!
//! This module fetches the landing page, the manifest, and every page image
//! through one [`HttpClient`] carrying the portal header set, and stores the
//! images as zero-padded numbered files.
//!
//! # Features
//!
//! - Streaming downloads through a `.part` file renamed on success
//! - Skip-if-present idempotence for resumable reruns
//! - IIIF size rewriting for the requested [`Quality`]
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use antenati_core::{HeaderSet, HttpClient, NoProgress, Quality, RecordDownloader};
//! use std::path::Path;
//!
//! # async fn example(image_urls: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&HeaderSet::browser())?;
//! let downloader = RecordDownloader::new(&client, Quality::High);
//! let stats = downloader
//!     .download_all(&image_urls, Path::new("Milano/Nati/1887"), 1, &NoProgress)
//!     .await?;
//! println!("{} pages fetched", stats.downloaded());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod failure;
pub mod filename;
mod quality;

pub use client::HttpClient;
pub use engine::{
    DownloadStats, NoProgress, PageOutcome, PageTask, ProgressReporter, RecordDownloader,
    last_page,
};
pub use error::DownloadError;
pub use failure::{FailureType, classify_error};
pub use quality::{HIGH_PIXELS, LOW_PIXELS, MID_PIXELS, Quality, QualityError, apply_quality};
