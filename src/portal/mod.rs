//! Portale Antenati page scraping and manifest access.
//!
//! Resolving a record is three forward steps:
//! 1. fetch the landing page ([`PortalClient::fetch_page`]),
//! 2. read the archive identifier out of it ([`extract_id`]),
//! 3. fetch the manifest ([`PortalClient::fetch_manifest`]) and derive
//!    [`Metadata`] and the page image URLs from it.

mod error;
mod identifier;
mod manifest;

use tracing::{debug, info, instrument};
use url::Url;

use crate::download::HttpClient;

pub use error::PortalError;
pub use identifier::{ARCHIVE_ID_LEN, ArchiveId, IdentifierError, WINDOWS_ID_MARKER, extract_id};
pub use manifest::{
    Canvas, ImageAnnotation, ImageResource, Manifest, Metadata, MetadataEntry, MetadataError,
    Sequence, derive_metadata, image_urls, parse_context, parse_year,
};

/// Host serving record manifests.
pub const DEFAULT_MANIFEST_BASE_URL: &str = "https://dam-antenati.cultura.gov.it";

/// A resolved record: identifier, metadata, and page images in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Manifest container identifier.
    pub id: ArchiveId,
    /// Derived organizational metadata.
    pub metadata: Metadata,
    /// Page image URLs in manifest order.
    pub image_urls: Vec<String>,
}

/// Client for the portal's landing pages and manifest host.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: HttpClient,
    manifest_base_url: String,
}

impl PortalClient {
    /// Creates a client against the public manifest host.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self::with_manifest_base_url(client, DEFAULT_MANIFEST_BASE_URL)
    }

    /// Creates a client with a custom manifest host (for testing with wiremock).
    #[must_use]
    pub fn with_manifest_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            manifest_base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Manifest URL for `id`.
    #[must_use]
    pub fn manifest_url(&self, id: &ArchiveId) -> String {
        format!(
            "{}/antenati/containers/{id}/manifest",
            self.manifest_base_url
        )
    }

    /// Fetches the landing page at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidPageUrl`] for non-http(s) URLs and
    /// [`PortalError::Transport`] for request failures.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, PortalError> {
        validate_page_url(url)?;
        debug!("downloading landing page");
        Ok(self.client.get_text(url).await?)
    }

    /// Fetches and parses the manifest for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Transport`] for request failures and
    /// [`PortalError::ManifestJson`] when the body is not a manifest.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_manifest(&self, id: &ArchiveId) -> Result<Manifest, PortalError> {
        let url = self.manifest_url(id);
        debug!(manifest_url = %url, "downloading manifest");
        let body = self.client.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|source| PortalError::ManifestJson { url, source })
    }

    /// Resolves a landing page into an [`Archive`].
    ///
    /// # Errors
    ///
    /// Returns the first [`PortalError`] from any of the three steps.
    pub async fn fetch_archive(&self, page_url: &str) -> Result<Archive, PortalError> {
        let page = self.fetch_page(page_url).await?;
        let id = extract_id(&page).map_err(|source| PortalError::Identifier {
            url: page_url.to_string(),
            source,
        })?;
        debug!(id = %id, "archive identifier found");

        let manifest = self.fetch_manifest(&id).await?;
        let metadata = derive_metadata(&manifest)?;
        let image_urls = image_urls(&manifest)?;
        info!(
            id = %id,
            city = %metadata.city,
            record_type = %metadata.record_type,
            year = %metadata.year,
            archive = %metadata.archive,
            source = %metadata.source,
            pages = metadata.pages,
            "archive resolved"
        );

        Ok(Archive {
            id,
            metadata,
            image_urls,
        })
    }
}

fn validate_page_url(url: &str) -> Result<(), PortalError> {
    let parsed =
        Url::parse(url).map_err(|e| PortalError::invalid_page_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(PortalError::invalid_page_url(
                url,
                format!("scheme '{scheme}' is not supported"),
            ));
        }
    }
    if parsed.host_str().is_none() {
        return Err(PortalError::invalid_page_url(url, "URL has no host"));
    }
    Ok(())
}
