//! Browser-like request headers shared by page, manifest, and image requests.
//!
//! The portal's image and manifest hosts expect traffic that looks like it
//! comes from the public viewer, so every request carries the same set.

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, HeaderMap, HeaderName, HeaderValue,
    InvalidHeaderValue, ORIGIN, PRAGMA, REFERER, USER_AGENT,
};

/// Desktop Safari User-Agent accepted by the portal.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15";

/// Origin of the public viewer; also used as Referer.
pub const PORTAL_ORIGIN: &str = "https://antenati.cultura.gov.it";

/// Ordered set of request headers applied as client defaults.
///
/// Setting a header that is already present replaces its value, so a
/// configured User-Agent can override the browser default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(HeaderName, String)>,
}

impl Default for HeaderSet {
    fn default() -> Self {
        Self::browser()
    }
}

impl HeaderSet {
    /// Header set with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The browser-mimicking set expected by the portal hosts.
    #[must_use]
    pub fn browser() -> Self {
        Self::empty()
            .with(USER_AGENT, BROWSER_USER_AGENT)
            .with(ACCEPT, "*/*")
            .with(ACCEPT_LANGUAGE, "it-IT,it;q=0.9")
            .with(ORIGIN, PORTAL_ORIGIN)
            .with(REFERER, format!("{PORTAL_ORIGIN}/"))
            .with(CONNECTION, "keep-alive")
            .with(CACHE_CONTROL, "no-cache")
            .with(PRAGMA, "no-cache")
    }

    /// Sets `name` to `value`, replacing any previous value.
    #[must_use]
    pub fn with(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
        self
    }

    /// Returns the value configured for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &HeaderName) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of configured headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no headers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the set into a reqwest header map.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHeaderValue`] when a value contains characters not
    /// allowed in HTTP headers (e.g. a newline in a configured User-Agent).
    pub fn to_header_map(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.insert(name.clone(), HeaderValue::from_str(value)?);
        }
        Ok(map)
    }
}
