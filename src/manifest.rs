//! Summary record describing one loaded search-index payload.

use crate::location::Location;
use index_parser::{Category, IndexRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Counts and checksum for a payload, used to spot index changes between builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Total record count.
    pub records: usize,
    /// Records tagged `section`.
    pub sections: usize,
    /// Records tagged `page`.
    pub pages: usize,
    /// Records with any other tag.
    pub other: usize,
    /// Distinct location paths (pages of the site).
    pub page_paths: usize,
    /// Sum of excerpt lengths in bytes.
    pub text_bytes: usize,
    /// CRC32 of the raw payload bytes, when they were available.
    pub checksum: Option<u32>,
}

impl IndexManifest {
    /// Derives a manifest from decoded records plus the payload checksum.
    pub fn from_records(records: &[IndexRecord], checksum: Option<u32>) -> Self {
        let mut manifest = Self {
            records: records.len(),
            sections: 0,
            pages: 0,
            other: 0,
            page_paths: 0,
            text_bytes: 0,
            checksum,
        };
        let mut paths = HashSet::new();
        for record in records {
            match record.category_kind() {
                Category::Section => manifest.sections += 1,
                Category::Page => manifest.pages += 1,
                Category::Other(_) => manifest.other += 1,
            }
            manifest.text_bytes += record.text.len();
            paths.insert(Location::parse(&record.location).path());
        }
        manifest.page_paths = paths.len();
        manifest
    }

    /// Helper that checksums `payload` and derives the manifest from its records.
    pub fn from_payload(payload: &[u8], records: &[IndexRecord]) -> Self {
        Self::from_records(records, Some(crc32fast::hash(payload)))
    }

    /// Whether `previous` describes different payload bytes.
    ///
    /// Manifests without checksums fall back to comparing counts.
    pub fn changed_since(&self, previous: &IndexManifest) -> bool {
        match (self.checksum, previous.checksum) {
            (Some(current), Some(prior)) => current != prior,
            _ => self != previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IndexManifest;
    use index_parser::IndexRecord;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<IndexRecord> {
        vec![
            IndexRecord::new("#Intro", "Home", "Intro", "", "section"),
            IndexRecord::new("", "Home", "Home", "abc", "page"),
            IndexRecord::new("api/", "API", "API", "de", "page"),
            IndexRecord::new("api/#run", "API", "run", "", "docstring"),
        ]
    }

    #[test]
    fn counts_categories_and_paths() {
        let manifest = IndexManifest::from_records(&sample(), Some(7));
        assert_eq!(
            manifest,
            IndexManifest {
                records: 4,
                sections: 1,
                pages: 2,
                other: 1,
                page_paths: 2,
                text_bytes: 5,
                checksum: Some(7),
            }
        );
    }

    #[test]
    fn detects_changes_by_checksum() {
        let records = sample();
        let a = IndexManifest::from_payload(b"one", &records);
        let b = IndexManifest::from_payload(b"one", &records);
        let c = IndexManifest::from_payload(b"two", &records);

        assert!(!a.changed_since(&b));
        assert!(a.changed_since(&c));
    }

    #[test]
    fn falls_back_to_counts_without_checksum() {
        let records = sample();
        let a = IndexManifest::from_records(&records, None);
        let b = IndexManifest::from_records(&records[..2], Some(1));
        assert!(a.changed_since(&b));
        assert!(!a.changed_since(&IndexManifest::from_records(&records, None)));
    }

    #[test]
    fn serializes_as_json() {
        let manifest = IndexManifest::from_records(&[], None);
        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(
            json,
            r#"{"records":0,"sections":0,"pages":0,"other":0,"page_paths":0,"text_bytes":0,"checksum":null}"#
        );
        let back: IndexManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
    }
}
