//! HTTP client wrapper for page, manifest, and image requests.
//!
//! This module provides the `HttpClient` struct which applies the portal
//! header set to every request, maps failures to [`DownloadError`], and
//! streams images to disk through a temporary file.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::filename::partial_path;
use crate::headers::HeaderSet;

/// HTTP client carrying the portal header set.
///
/// Created once per run and shared by the page fetch, the manifest fetch,
/// and every image download, so connections are pooled.
///
/// # Example
///
/// ```no_run
/// use antenati_core::{HeaderSet, HttpClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&HeaderSet::browser())?;
/// let page = client.get_text("https://antenati.cultura.gov.it/ark:/12657/an_ua123").await?;
/// println!("{} bytes of HTML", page.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with default timeouts (30s connect, 5min read).
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] when a header value is invalid
    /// or the TLS backend fails to initialize.
    pub fn new(headers: &HeaderSet) -> Result<Self, DownloadError> {
        Self::with_timeouts(headers, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`new`](Self::new).
    pub fn with_timeouts(
        headers: &HeaderSet,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let default_headers = headers
            .to_header_map()
            .map_err(|e| DownloadError::client_build(format!("invalid header value: {e}")))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .default_headers(default_headers)
            .build()
            .map_err(|e| DownloadError::client_build(e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetches `url` and decodes the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - The body is not valid UTF-8
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.send_get(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(url, e))?;
        debug!(bytes = body.len(), "received body");
        String::from_utf8(body.to_vec()).map_err(|_| DownloadError::decode(url))
    }

    /// Downloads `url` to `path`, returning the number of bytes written.
    ///
    /// The body is streamed into `<path>.part`, which is renamed to `path`
    /// only after the last byte is flushed. On failure the partial file is
    /// removed and `path` is left untouched. The parent directory must exist.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` for invalid URLs, transport failures, non-2xx
    /// responses, and filesystem errors.
    #[instrument(level = "debug", skip(self, path), fields(url = %url, path = %path.display()))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let response = self.send_get(url).await?;

        let partial = partial_path(path);
        let file = File::create(&partial)
            .await
            .map_err(|e| DownloadError::io(partial.clone(), e))?;

        let stream_result = stream_to_file(file, response, url, &partial).await;
        let bytes_written = match stream_result {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %partial.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(error);
            }
        };

        tokio::fs::rename(&partial, path)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

        debug!(bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

fn map_request_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::network(url, error)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| map_request_error(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
