//! Error types for portal scraping and manifest handling.

use thiserror::Error;

use super::identifier::IdentifierError;
use super::manifest::MetadataError;
use crate::download::DownloadError;

/// Errors resolving a landing page into record metadata and image URLs.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The archive URL is not an absolute http(s) URL.
    #[error("invalid archive URL '{url}': {reason}\n  Suggestion: pass the record page URL from antenati.cultura.gov.it")]
    InvalidPageUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Page or manifest request failed.
    #[error(transparent)]
    Transport(#[from] DownloadError),

    /// The landing page carries no usable identifier.
    #[error("could not extract archive identifier from {url}: {source}")]
    Identifier {
        /// The landing page URL.
        url: String,
        /// What went wrong.
        #[source]
        source: IdentifierError,
    },

    /// The manifest body is not the expected JSON document.
    #[error("malformed manifest JSON from {url}: {source}")]
    ManifestJson {
        /// The manifest URL.
        url: String,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed but lacks an expected field.
    #[error("unexpected manifest structure: {0}")]
    Metadata(#[from] MetadataError),
}

impl PortalError {
    /// Creates an invalid page URL error.
    pub fn invalid_page_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPageUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns the transport error if this failure came from the network.
    #[must_use]
    pub fn as_transport(&self) -> Option<&DownloadError> {
        match self {
            Self::Transport(error) => Some(error),
            _ => None,
        }
    }
}
