//! Parsed view of a record's `location` fragment.

use std::fmt;
use url::Url;

/// A location split into page path and optional in-page anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location<'a> {
    raw: &'a str,
    path: &'a str,
    anchor: Option<&'a str>,
}

impl<'a> Location<'a> {
    /// Splits `raw` at its first `#`. Never fails; any string is a location.
    pub fn parse(raw: &'a str) -> Self {
        let (path, anchor) = match raw.split_once('#') {
            Some((path, anchor)) => (path, Some(anchor)),
            None => (raw, None),
        };
        Self { raw, path, anchor }
    }

    /// The unmodified location string.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Page path in front of the anchor; empty for the site root.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// In-page anchor without the leading `#`.
    pub fn anchor(&self) -> Option<&'a str> {
        self.anchor
    }

    /// True when the location points at a page rather than a section within it.
    pub fn is_page_level(&self) -> bool {
        self.anchor.is_none()
    }

    /// Resolves the location against the documentation site's base URL.
    ///
    /// The base should end in `/` so relative paths land inside it.
    pub fn resolve(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(self.raw)
    }
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
