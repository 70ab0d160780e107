//! IIIF manifest types and record metadata derivation.
//!
//! Only the parts of the manifest the download needs are modeled. The
//! portal's metadata list is positional: entry 1 is the record type, entry 2
//! the date ("1887 - 1888/12"), entry 3 the provenance
//! ("Archivio > Fondo > Comune").

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::download::filename::sanitize_path_component;

/// Metadata index holding the record type.
const TYPE_INDEX: usize = 1;
/// Metadata index holding the date range.
const YEAR_INDEX: usize = 2;
/// Metadata index holding the `archive > source > city` chain.
const CONTEXT_INDEX: usize = 3;

const CONTEXT_SEPARATOR: &str = " > ";
const YEAR_RANGE_SEPARATOR: &str = " - ";

/// Manifest does not have the shape the portal normally serves.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// Positional metadata entry is absent.
    #[error("manifest metadata has no entry at index {index}")]
    MissingEntry {
        /// Requested index.
        index: usize,
    },

    /// Metadata entry value is not a plain string.
    #[error("manifest metadata entry {index} is not a string")]
    NotText {
        /// Offending index.
        index: usize,
    },

    /// Provenance chain has fewer than three ` > `-separated parts.
    #[error("manifest context '{value}' is not of the form 'archive > source > city'")]
    MalformedContext {
        /// The raw value.
        value: String,
    },

    /// The manifest has no image sequence.
    #[error("manifest has no image sequence")]
    MissingSequence,

    /// A canvas carries no image resource.
    #[error("canvas {index} has no image resource")]
    MissingImage {
        /// Zero-based canvas index.
        index: usize,
    },
}

/// IIIF Presentation manifest as served by the portal.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Manifest {
    /// Manifest URI.
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    /// Human-readable title.
    #[serde(default)]
    pub label: Option<serde_json::Value>,
    /// Positional label/value pairs.
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    /// Page sequences; only the first is used.
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

/// One label/value pair from the manifest's metadata list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetadataEntry {
    /// Entry label (e.g. "Tipologia").
    #[serde(default)]
    pub label: Option<serde_json::Value>,
    /// Entry value, a plain string on the portal. `Null` when absent.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Ordered list of canvases.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Sequence {
    /// One canvas per page.
    #[serde(default)]
    pub canvases: Vec<Canvas>,
}

/// One page of the record.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Canvas {
    /// Canvas label (usually "pag. N").
    #[serde(default)]
    pub label: Option<serde_json::Value>,
    /// Image annotations; the first one is the page image.
    #[serde(default)]
    pub images: Vec<ImageAnnotation>,
}

/// Annotation painting an image onto a canvas.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageAnnotation {
    /// The image itself.
    #[serde(default)]
    pub resource: Option<ImageResource>,
}

/// Image served by the IIIF image API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageResource {
    /// Full image URL (`.../full/full/0/default.jpg`).
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
}

impl Manifest {
    /// Value of the metadata entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingEntry`] or [`MetadataError::NotText`].
    pub fn metadata_value(&self, index: usize) -> Result<&str, MetadataError> {
        self.metadata
            .get(index)
            .ok_or(MetadataError::MissingEntry { index })?
            .value
            .as_str()
            .ok_or(MetadataError::NotText { index })
    }

    /// Canvases of the first sequence.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingSequence`] when there is no sequence.
    pub fn canvases(&self) -> Result<&[Canvas], MetadataError> {
        self.sequences
            .first()
            .map(|sequence| sequence.canvases.as_slice())
            .ok_or(MetadataError::MissingSequence)
    }
}

/// Organizational metadata of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// First year of the record's date range.
    pub year: String,
    /// Record type (e.g. "Nati", "Matrimoni").
    pub record_type: String,
    /// Holding archive.
    pub archive: String,
    /// Fonds within the archive.
    pub source: String,
    /// Municipality the record belongs to.
    pub city: String,
    /// Number of pages (canvases).
    pub pages: usize,
}

impl Metadata {
    /// Directory for this record relative to the output root: `city/type/year`.
    #[must_use]
    pub fn relative_dir(&self) -> PathBuf {
        [&self.city, &self.record_type, &self.year]
            .iter()
            .map(|component| sanitize_path_component(component))
            .collect()
    }

    /// One-line summary shown before downloading: `city: type (year)`.
    #[must_use]
    pub fn banner(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.city, self.record_type, self.year)
    }
}

/// First year of a portal date value.
///
/// `"1900 - 1910/01"` and `"1895/03"` give `"1900"` and `"1895"`.
#[must_use]
pub fn parse_year(value: &str) -> &str {
    let date = value.split('/').next().unwrap_or(value);
    date.split(YEAR_RANGE_SEPARATOR).next().unwrap_or(date)
}

/// Splits `archive > source > city`. Parts beyond the third are ignored.
///
/// # Errors
///
/// Returns [`MetadataError::MalformedContext`] with fewer than three parts.
pub fn parse_context(value: &str) -> Result<(&str, &str, &str), MetadataError> {
    let mut parts = value.split(CONTEXT_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(archive), Some(source), Some(city)) => Ok((archive, source, city)),
        _ => Err(MetadataError::MalformedContext {
            value: value.to_string(),
        }),
    }
}

/// Derives record metadata from the manifest.
///
/// # Errors
///
/// Returns [`MetadataError`] when a positional entry is missing or not a
/// string, the context chain is malformed, or there is no sequence.
pub fn derive_metadata(manifest: &Manifest) -> Result<Metadata, MetadataError> {
    let record_type = manifest.metadata_value(TYPE_INDEX)?;
    let year = parse_year(manifest.metadata_value(YEAR_INDEX)?);
    let (archive, source, city) = parse_context(manifest.metadata_value(CONTEXT_INDEX)?)?;
    let pages = manifest.canvases()?.len();

    Ok(Metadata {
        year: year.to_string(),
        record_type: record_type.to_string(),
        archive: archive.to_string(),
        source: source.to_string(),
        city: city.to_string(),
        pages,
    })
}

/// Page image URLs in manifest order.
///
/// # Errors
///
/// Returns [`MetadataError::MissingSequence`] or
/// [`MetadataError::MissingImage`] for a canvas whose first image has no
/// resource URL.
pub fn image_urls(manifest: &Manifest) -> Result<Vec<String>, MetadataError> {
    manifest
        .canvases()?
        .iter()
        .enumerate()
        .map(|(index, canvas)| {
            canvas
                .images
                .first()
                .and_then(|image| image.resource.as_ref()?.id.clone())
                .ok_or(MetadataError::MissingImage { index })
        })
        .collect()
}
