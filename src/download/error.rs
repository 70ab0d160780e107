//! Failures of page, manifest, and image transfers.
//!
//! Every variant names the URL or path involved so a failed run can be
//! resumed by hand.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching pages, manifests, or images.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The portal or image server could not be reached.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// Error reported by reqwest.
        #[source]
        source: reqwest::Error,
    },

    /// Connect or read deadline elapsed.
    #[error("timeout fetching {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// Server answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// Response body was expected to be UTF-8 text but was not.
    #[error("response from {url} is not valid UTF-8")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
    },

    /// File system error (create directory, write, rename, etc.)
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// Error reported by the OS.
        #[source]
        source: std::io::Error,
    },

    /// URL does not parse.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// Rejected input.
        url: String,
    },

    /// Image URL does not carry a `full/<size>` segment pair to rewrite.
    #[error("unsupported image URL {url}: {reason}")]
    UnsupportedImageUrl {
        /// The image URL taken from the manifest.
        url: String,
        /// What was missing.
        reason: &'static str,
    },

    /// Page numbering would overflow `u32`.
    #[error("page range starting at {start} with {pages} pages overflows")]
    PageRange {
        /// First page number.
        start: u32,
        /// Number of pages in the record.
        pages: usize,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },
}

impl DownloadError {
    /// Wraps a reqwest failure for `url`.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Non-success status for `url`.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Deadline elapsed for `url`.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a UTF-8 decoding error.
    pub fn decode(url: impl Into<String>) -> Self {
        Self::Decode { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `url` failed to parse.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an unsupported image URL error.
    pub fn unsupported_image_url(url: impl Into<String>, reason: &'static str) -> Self {
        Self::UnsupportedImageUrl {
            url: url.into(),
            reason,
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the url
// or path, which the source errors don't carry.
