//! Antenati Core Library
//!
//! This library provides the core functionality for `antenati-dl`, which
//! downloads the page images of one archival record from Portale Antenati
//! into a `city/type/year` directory tree.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`headers`] - Browser-like header set sent with every request
//! - [`portal`] - Landing page scraping, manifest fetching, metadata derivation
//! - [`download`] - HTTP client, quality rewriting, and the page download loop

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod headers;
pub mod portal;

// Re-export commonly used types
pub use download::{
    DownloadError, DownloadStats, FailureType, HttpClient, NoProgress, PageOutcome, PageTask,
    ProgressReporter, Quality, QualityError, RecordDownloader, classify_error,
};
pub use headers::HeaderSet;
pub use portal::{
    Archive, ArchiveId, IdentifierError, Manifest, Metadata, MetadataError, PortalClient,
    PortalError, derive_metadata, extract_id,
};
