//! Image quality tiers and IIIF size rewriting.
//!
//! Page images are served by a IIIF image API whose URLs look like
//! `{base}/{id}/full/{size}/0/default.jpg`. The manifest hands out URLs with
//! `full` as the size; the requested tier replaces it with `{pixels},`
//! (width-constrained scaling).

use std::fmt;
use std::num::NonZeroU32;
use std::ops::Range;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use super::DownloadError;

/// Pixel width for [`Quality::High`].
pub const HIGH_PIXELS: u32 = 2048;
/// Pixel width for [`Quality::Mid`].
pub const MID_PIXELS: u32 = 1024;
/// Pixel width for [`Quality::Low`].
pub const LOW_PIXELS: u32 = 512;

/// Requested resolution of downloaded page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// 2048 pixels wide.
    High,
    /// 1024 pixels wide.
    #[default]
    Mid,
    /// 512 pixels wide.
    Low,
    /// Explicit pixel width.
    Pixels(NonZeroU32),
}

impl Quality {
    /// Target pixel width for this tier.
    #[must_use]
    pub fn pixels(self) -> u32 {
        match self {
            Self::High => HIGH_PIXELS,
            Self::Mid => MID_PIXELS,
            Self::Low => LOW_PIXELS,
            Self::Pixels(n) => n.get(),
        }
    }
}

/// Error parsing a quality tier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid quality '{value}': expected high, mid, low, or a positive pixel width")]
pub struct QualityError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Quality {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "mid" => Ok(Self::Mid),
            "low" => Ok(Self::Low),
            other => other
                .parse::<NonZeroU32>()
                .map(Self::Pixels)
                .map_err(|_| QualityError {
                    value: s.to_string(),
                }),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Mid => write!(f, "mid"),
            Self::Low => write!(f, "low"),
            Self::Pixels(n) => write!(f, "{n}"),
        }
    }
}

/// Rewrites the IIIF size segment of `url` to request `pixels` wide images.
///
/// The segment after the first `full` path segment is replaced by
/// `{pixels},`. Only those bytes change: host casing, port, escapes, the
/// query, and the fragment are copied from `url` as given.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] when `url` does not parse and
/// [`DownloadError::UnsupportedImageUrl`] when it has no `full` segment
/// followed by a size segment.
pub fn apply_quality(url: &str, pixels: u32) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
    if !parsed.has_authority() {
        return Err(DownloadError::unsupported_image_url(url, "URL has no host"));
    }

    let size = size_segment_range(url)
        .map_err(|reason| DownloadError::unsupported_image_url(url, reason))?;

    let mut rewritten = String::with_capacity(url.len() + 8);
    rewritten.push_str(&url[..size.start]);
    rewritten.push_str(&format!("{pixels},"));
    rewritten.push_str(&url[size.end..]);
    Ok(rewritten)
}

/// Byte range of the path segment following the first `full` segment.
fn size_segment_range(url: &str) -> Result<Range<usize>, &'static str> {
    let authority_start = url.find("://").map(|i| i + 3).ok_or("URL has no path")?;
    let path_start = match url[authority_start..].find(['/', '?', '#']) {
        Some(i) if url.as_bytes()[authority_start + i] == b'/' => authority_start + i,
        _ => return Err("URL has no path"),
    };
    let path_end = url[path_start..]
        .find(['?', '#'])
        .map_or(url.len(), |i| path_start + i);

    let mut offset = path_start;
    let mut segments = url[path_start..path_end].split('/').map(|segment| {
        let range = offset..offset + segment.len();
        offset = range.end + 1;
        (segment, range)
    });

    segments
        .by_ref()
        .find(|(segment, _)| *segment == "full")
        .ok_or("no `full` segment")?;
    match segments.next() {
        Some((segment, range)) if !segment.is_empty() => Ok(range),
        _ => Err("no size segment after `full`"),
    }
}
