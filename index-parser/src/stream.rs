//! Streaming record decoding on top of `serde_json`'s reader deserializer.

use crate::{assignment_body, debug_log, script_keyword_len, IndexRecord, MalformedRecordError};
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read};

/// Visits the records of a payload one at a time, straight from a reader.
///
/// Only the record being validated is held in memory. Both the bare JSON form
/// and the script-assignment form are accepted.
pub struct RecordStream<R> {
    reader: BufReader<R>,
}

impl<R: Read> RecordStream<R> {
    /// Wraps a reader positioned at the start of a payload.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Calls `visit` for each record in stored order and returns the record count.
    ///
    /// Records already visited stay visited when a later one fails validation.
    pub fn for_each<F>(self, mut visit: F) -> Result<usize, StreamError>
    where
        F: FnMut(IndexRecord),
    {
        let mut reader = PositionReader::new(self.reader);
        let wrapped = skip_script_prefix(&mut reader)?;

        let count = {
            let mut de = serde_json::Deserializer::from_reader(&mut reader);
            let count = decode_payload::<_, _, StreamError>(&mut de, &mut visit)?;
            if !wrapped {
                de.end()?;
            }
            count
        };

        if wrapped {
            expect_script_tail(&mut reader)?;
        }
        debug_log!("streamed {count} records (wrapped={wrapped})");
        Ok(count)
    }
}

/// Convenience helper that collects every streamed record.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<IndexRecord>, StreamError> {
    let mut records = Vec::new();
    RecordStream::new(reader).for_each(|record| records.push(record))?;
    Ok(records)
}

/// Drives one `{"docs": [...]}` value through `visit`, validating records as they arrive.
///
/// Shared by the buffered and streaming entry points so both accept and reject
/// the same payloads. Trailing input is left to the caller.
pub(crate) fn decode_payload<'de, R, F, E>(
    de: &mut serde_json::Deserializer<R>,
    visit: &mut F,
) -> Result<usize, E>
where
    R: serde_json::de::Read<'de>,
    F: FnMut(IndexRecord),
    E: From<serde_json::Error> + From<MalformedRecordError>,
{
    let mut failure = None;
    let outcome = PayloadSeed {
        visit,
        failure: &mut failure,
    }
    .deserialize(&mut *de);
    match failure {
        Some(err) => Err(E::from(err)),
        None => outcome.map_err(E::from),
    }
}

/// Errors surfaced while streaming a payload.
#[derive(Debug)]
pub enum StreamError {
    /// The underlying reader failed.
    Io(io::Error),
    /// The payload violated the schema.
    Malformed(MalformedRecordError),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read payload: {err}"),
            Self::Malformed(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Malformed(err) => Some(err),
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(io::Error::from(err))
        } else {
            Self::Malformed(MalformedRecordError::from(err))
        }
    }
}

impl From<MalformedRecordError> for StreamError {
    fn from(err: MalformedRecordError) -> Self {
        Self::Malformed(err)
    }
}

struct PayloadSeed<'a, F> {
    visit: &'a mut F,
    failure: &'a mut Option<MalformedRecordError>,
}

impl<'de, 'a, F> DeserializeSeed<'de> for PayloadSeed<'a, F>
where
    F: FnMut(IndexRecord),
{
    type Value = usize;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a, F> Visitor<'de> for PayloadSeed<'a, F>
where
    F: FnMut(IndexRecord),
{
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a `docs` array")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut count = None;
        while let Some(key) = map.next_key::<String>()? {
            if key != "docs" {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if count.is_some() {
                return Err(reject(self.failure, "duplicate field `docs`"));
            }
            let docs = DocsSeed {
                visit: &mut *self.visit,
                failure: &mut *self.failure,
            };
            count = Some(map.next_value_seed(docs)?);
        }
        count.ok_or_else(|| reject(self.failure, "missing field `docs`"))
    }
}

/// Records a top-level failure and returns the error that aborts deserialization.
fn reject<E: de::Error>(failure: &mut Option<MalformedRecordError>, message: &str) -> E {
    *failure = Some(MalformedRecordError::TopLevel {
        message: message.to_string(),
    });
    E::custom(message)
}

struct DocsSeed<'a, F> {
    visit: &'a mut F,
    failure: &'a mut Option<MalformedRecordError>,
}

impl<'de, 'a, F> DeserializeSeed<'de> for DocsSeed<'a, F>
where
    F: FnMut(IndexRecord),
{
    type Value = usize;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, 'a, F> Visitor<'de> for DocsSeed<'a, F>
where
    F: FnMut(IndexRecord),
{
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a `docs` array")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut index = 0usize;
        while let Some(value) = seq.next_element::<Value>()? {
            match IndexRecord::from_value(index, value) {
                Ok(record) => (self.visit)(record),
                Err(err) => {
                    let message = err.to_string();
                    *self.failure = Some(err);
                    return Err(de::Error::custom(message));
                }
            }
            index += 1;
        }
        Ok(index)
    }
}

/// Consumes a leading script assignment up to its `=`. Returns whether one was present.
///
/// Input that does not open with `var`, `let` or `const` plus whitespace is left
/// for the JSON deserializer to judge.
fn skip_script_prefix<R: Read>(reader: &mut PositionReader<R>) -> Result<bool, StreamError> {
    if skip_whitespace(reader)?.is_none() {
        return Ok(false);
    }
    if script_keyword_len(reader.fill_buf()?).is_none() {
        return Ok(false);
    }
    let (line, column) = reader.next_position();
    let mut prefix = Vec::new();
    reader.read_until(b'=', &mut prefix)?;
    let prefix = String::from_utf8_lossy(&prefix);
    if prefix.ends_with('=') && assignment_body(&prefix).is_some() {
        Ok(true)
    } else {
        Err(StreamError::Malformed(MalformedRecordError::Syntax {
            line,
            column,
            message: "script assignment is missing `=`".to_string(),
        }))
    }
}

/// After a script assignment only whitespace and a single `;` may follow.
fn expect_script_tail<R: Read>(reader: &mut PositionReader<R>) -> Result<(), StreamError> {
    let mut seen_semicolon = false;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(());
        }
        let mut offending = None;
        for (pos, &byte) in buf.iter().enumerate() {
            match byte {
                b';' if !seen_semicolon => seen_semicolon = true,
                byte if byte.is_ascii_whitespace() => {}
                _ => {
                    offending = Some(pos);
                    break;
                }
            }
        }
        match offending {
            Some(pos) => {
                reader.consume(pos);
                let (line, column) = reader.next_position();
                return Err(StreamError::Malformed(MalformedRecordError::Syntax {
                    line,
                    column,
                    message: format!(
                        "trailing characters after script assignment at line {line} column {column}"
                    ),
                }));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

fn skip_whitespace<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|byte| !byte.is_ascii_whitespace()) {
            Some(pos) => {
                let next = buf[pos];
                reader.consume(pos);
                return Ok(Some(next));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Buffered reader that tracks the line and column of everything handed out.
struct PositionReader<R> {
    inner: BufReader<R>,
    position: Position,
}

/// 1-based line; `column` counts bytes already consumed on that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    line: usize,
    column: usize,
}

impl Position {
    fn advance(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == b'\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }
}

impl<R: Read> PositionReader<R> {
    fn new(inner: BufReader<R>) -> Self {
        Self {
            inner,
            position: Position { line: 1, column: 0 },
        }
    }

    /// Line and 1-based column of the next unread byte.
    fn next_position(&self) -> (usize, usize) {
        (self.position.line, self.position.column + 1)
    }
}

impl<R: Read> Read for PositionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.position.advance(&buf[..read]);
        Ok(read)
    }
}

impl<R: Read> BufRead for PositionReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        let buffered = self.inner.buffer();
        self.position.advance(&buffered[..amt.min(buffered.len())]);
        self.inner.consume(amt);
    }
}
