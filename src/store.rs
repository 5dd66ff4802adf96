//! Read-only store over the records of one search-index payload.

use crate::manifest::IndexManifest;
use crate::outline::{outline, PageOutline};
use crc32fast::Hasher as Crc32;
use index_parser::{IndexRecord, MalformedRecordError, RecordStream, StreamError};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::slice;

/// Immutable, ordered sequence of index records.
///
/// The store never changes after construction, so it can be shared across
/// threads behind an `Arc` without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecordStore {
    records: Vec<IndexRecord>,
    checksum: Option<u32>,
}

impl IndexRecordStore {
    /// Parses a payload held in memory.
    ///
    /// # Example
    ///
    /// ```
    /// use docindex::IndexRecordStore;
    ///
    /// let store = IndexRecordStore::load(
    ///     r##"{"docs":[{"location":"/#intro","page":"Home","title":"Home","text":"hello","category":"section"}]}"##,
    /// )
    /// .unwrap();
    /// let titles: Vec<_> = store.iterate().map(|record| record.title.as_str()).collect();
    /// assert_eq!(titles, ["Home"]);
    /// ```
    pub fn load(source: &str) -> Result<Self, MalformedRecordError> {
        let records = index_parser::parse_payload(source)?;
        Ok(Self {
            records,
            checksum: Some(crc32fast::hash(source.as_bytes())),
        })
    }

    /// Byte-oriented variant of [`IndexRecordStore::load`].
    pub fn load_bytes(source: &[u8]) -> Result<Self, MalformedRecordError> {
        let records = index_parser::parse_payload_bytes(source)?;
        Ok(Self {
            records,
            checksum: Some(crc32fast::hash(source)),
        })
    }

    /// Streams a payload from `reader`, checksumming the bytes as they pass.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut hashing = HashingReader::new(reader);
        let mut records = Vec::new();
        RecordStream::new(&mut hashing)
            .for_each(|record| records.push(record))
            .map_err(StoreError::from_stream)?;
        crate::debug_log!("streamed {} records", records.len());
        Ok(Self {
            records,
            checksum: Some(hashing.finalize()),
        })
    }

    /// Opens and streams a payload file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        Self::from_reader(file).map_err(|err| err.with_path(path))
    }

    /// Wraps records that were decoded elsewhere. No checksum is recorded.
    pub fn from_records(records: Vec<IndexRecord>) -> Self {
        Self {
            records,
            checksum: None,
        }
    }

    /// Restartable traversal of every record in stored order.
    pub fn iterate(&self) -> slice::Iter<'_, IndexRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the payload held an empty `docs` array.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&IndexRecord> {
        self.records.get(index)
    }

    /// All records as a slice.
    pub fn as_slice(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Records whose raw `category` tag equals `category`, in stored order.
    pub fn with_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a IndexRecord> + 'a {
        self.iterate()
            .filter(move |record| record.category == category)
    }

    /// Groups records by page path. See [`crate::outline`].
    pub fn pages(&self) -> Vec<PageOutline<'_>> {
        outline(self.iterate())
    }

    /// CRC32 of the loaded payload bytes, when the store was loaded from bytes.
    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    /// Summary counts plus the payload checksum.
    pub fn manifest(&self) -> IndexManifest {
        IndexManifest::from_records(&self.records, self.checksum)
    }
}

impl<'a> IntoIterator for &'a IndexRecordStore {
    type Item = &'a IndexRecord;
    type IntoIter = slice::Iter<'a, IndexRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iterate()
    }
}

/// Errors surfaced while loading a store from a reader or file.
#[derive(Debug)]
pub enum StoreError {
    /// Reading the payload failed.
    Io {
        /// File being read, when known.
        path: Option<PathBuf>,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The payload did not match the search-index schema.
    Malformed(MalformedRecordError),
}

impl StoreError {
    fn from_stream(err: StreamError) -> Self {
        match err {
            StreamError::Io(source) => Self::Io { path: None, source },
            StreamError::Malformed(err) => Self::Malformed(err),
        }
    }

    fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Io { path: None, source } => Self::Io {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "failed to read payload: {source}"),
            Self::Malformed(err) => write!(f, "malformed search index: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed(err) => Some(err),
        }
    }
}

impl From<MalformedRecordError> for StoreError {
    fn from(err: MalformedRecordError) -> Self {
        Self::Malformed(err)
    }
}

struct HashingReader<R> {
    inner: R,
    hasher: Crc32,
}

impl<R> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Crc32::new(),
        }
    }

    fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.hasher.update(&buf[..read]);
        Ok(read)
    }
}
