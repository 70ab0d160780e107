//! Archive identifier extraction from the record landing page.
//!
//! The viewer page embeds the manifest container id in an inline script:
//! `let windowsId = 'abc1234';`. The id is a fixed-length token read right
//! after that marker.

use std::fmt;

use thiserror::Error;

/// Literal that precedes the identifier in the landing page.
pub const WINDOWS_ID_MARKER: &str = "let windowsId = '";

/// Number of characters in an archive identifier.
pub const ARCHIVE_ID_LEN: usize = 7;

/// Errors extracting the archive identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// The page has no identifier marker (not a record viewer page, or the
    /// portal changed its markup).
    #[error("archive identifier marker `{WINDOWS_ID_MARKER}` not found in page")]
    MarkerNotFound,

    /// The page ends before a full identifier follows the marker.
    #[error("archive identifier truncated: expected {ARCHIVE_ID_LEN} characters, found {found}")]
    Truncated {
        /// Characters available after the marker.
        found: usize,
    },
}

/// Opaque identifier addressing a record's manifest container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveId(String);

impl ArchiveId {
    /// Wraps an identifier obtained elsewhere (e.g. from a known manifest URL).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the [`ARCHIVE_ID_LEN`] characters following the first
/// [`WINDOWS_ID_MARKER`] in `page`.
///
/// # Errors
///
/// Returns [`IdentifierError::MarkerNotFound`] when the marker is absent and
/// [`IdentifierError::Truncated`] when fewer than [`ARCHIVE_ID_LEN`]
/// characters follow it.
pub fn extract_id(page: &str) -> Result<ArchiveId, IdentifierError> {
    let start = page
        .find(WINDOWS_ID_MARKER)
        .ok_or(IdentifierError::MarkerNotFound)?
        + WINDOWS_ID_MARKER.len();

    let id: String = page[start..].chars().take(ARCHIVE_ID_LEN).collect();
    let found = id.chars().count();
    if found < ARCHIVE_ID_LEN {
        return Err(IdentifierError::Truncated { found });
    }
    Ok(ArchiveId(id))
}
