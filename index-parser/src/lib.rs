//! Decode documentation search-index payloads into typed records.
//!
//! Documentation generators emit the searchable fragments of a site as a
//! `{"docs": [...]}` object, usually wrapped in a script assignment such as
//! `var documenterSearchIndex = {...}`. This crate accepts both forms and
//! validates every record before handing it out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;

mod stream;

// This enables or disables the eprintln! macro, effectively removing it from the code when the
// "debug_logs" feature is disabled.
#[cfg(feature = "debug_logs")]
#[macro_export]
macro_rules! debug_log {
        ($($arg:tt)*) => {
            eprintln!($($arg)*);
        };
    }
#[cfg(not(feature = "debug_logs"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Field names every record must carry, in serialization order.
pub const REQUIRED_FIELDS: [&str; 5] = ["location", "page", "title", "text", "category"];

const SCRIPT_KEYWORDS: &[&str] = &["var", "let", "const"];

/// One searchable documentation fragment: a page or a named section within a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRecord {
    /// URL fragment of the page, optionally followed by `#Anchor`.
    pub location: String,
    /// Human-readable page title.
    pub page: String,
    /// Human-readable section title; equals `page` for page-level entries.
    pub title: String,
    /// Plain-text excerpt. Empty for header-only section entries.
    pub text: String,
    /// Entry kind tag, usually `"section"` or `"page"`.
    pub category: String,
}

impl IndexRecord {
    /// Builds a record from its five fields.
    pub fn new(
        location: impl Into<String>,
        page: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            page: page.into(),
            title: title.into(),
            text: text.into(),
            category: category.into(),
        }
    }

    /// Validates one element of the `docs` array.
    ///
    /// `index` is the element's position and only feeds error reporting.
    /// Fields outside [`REQUIRED_FIELDS`] are ignored.
    pub fn from_value(index: usize, value: Value) -> Result<Self, MalformedRecordError> {
        let Value::Object(mut fields) = value else {
            return Err(MalformedRecordError::NotAnObject { index });
        };
        let [location, page, title, text, category] =
            REQUIRED_FIELDS.map(|field| take_string(&mut fields, index, field));
        Ok(Self {
            location: location?,
            page: page?,
            title: title?,
            text: text?,
            category: category?,
        })
    }

    /// Classified view of the raw `category` tag.
    pub fn category_kind(&self) -> Category {
        Category::parse(&self.category)
    }
}

/// Classification of the `category` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// A named section (the location usually carries an anchor).
    Section,
    /// Body text belonging to a page.
    Page,
    /// Any tag outside the known set, kept verbatim.
    Other(String),
}

impl Category {
    /// Classifies a raw tag. Never fails; unknown tags map to [`Category::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "section" => Self::Section,
            "page" => Self::Page,
            other => Self::Other(other.to_string()),
        }
    }

    /// The raw tag this category was parsed from.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Section => "section",
            Self::Page => "page",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a payload does not match the search-index schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    /// The payload is not well-formed JSON. Line and column are 1-based; 0 means unknown.
    Syntax {
        /// Line of the failure.
        line: usize,
        /// Column of the failure.
        column: usize,
        /// Parser diagnostic.
        message: String,
    },
    /// The top-level value is not an object holding a `docs` array.
    TopLevel {
        /// What was wrong with the top-level value.
        message: String,
    },
    /// An element of `docs` is not an object.
    NotAnObject {
        /// Position of the element inside `docs`.
        index: usize,
    },
    /// A record lacks one of the required fields.
    MissingField {
        /// Position of the record inside `docs`.
        index: usize,
        /// Name of the absent field.
        field: &'static str,
    },
    /// A required field holds something other than a string.
    WrongType {
        /// Position of the record inside `docs`.
        index: usize,
        /// Name of the offending field.
        field: &'static str,
        /// JSON type that was found instead.
        found: &'static str,
    },
}

impl MalformedRecordError {
    /// Position of the offending record, when the failure is tied to one.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::NotAnObject { index }
            | Self::MissingField { index, .. }
            | Self::WrongType { index, .. } => Some(*index),
            Self::Syntax { .. } | Self::TopLevel { .. } => None,
        }
    }
}

impl fmt::Display for MalformedRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message, .. } => write!(f, "invalid payload: {message}"),
            Self::TopLevel { message } => write!(f, "invalid payload structure: {message}"),
            Self::NotAnObject { index } => write!(f, "record {index} is not an object"),
            Self::MissingField { index, field } => {
                write!(f, "record {index} is missing required field `{field}`")
            }
            Self::WrongType {
                index,
                field,
                found,
            } => write!(
                f,
                "record {index} field `{field}` must be a string, found {found}"
            ),
        }
    }
}

impl Error for MalformedRecordError {}

impl From<serde_json::Error> for MalformedRecordError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => Self::TopLevel {
                message: err.to_string(),
            },
            _ => Self::Syntax {
                line: err.line(),
                column: err.column(),
                message: err.to_string(),
            },
        }
    }
}

/// Parses a payload in either bare JSON or script-assignment form.
///
/// # Example
///
/// ```
/// use index_parser::parse_payload;
///
/// let payload = r##"var documenterSearchIndex = {"docs":[
///   {"location":"/#intro","page":"Home","title":"Home","text":"hello","category":"section"}
/// ]}"##;
/// let records = parse_payload(payload).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].location, "/#intro");
/// ```
pub fn parse_payload(input: &str) -> Result<Vec<IndexRecord>, MalformedRecordError> {
    let mut de = serde_json::Deserializer::from_str(strip_script_wrapper(input));
    let mut records = Vec::new();
    stream::decode_payload::<_, _, MalformedRecordError>(&mut de, &mut |record| {
        records.push(record)
    })?;
    de.end()?;
    debug_log!("parsed {} records", records.len());
    Ok(records)
}

/// Byte-oriented variant of [`parse_payload`]. Invalid UTF-8 is a syntax error.
pub fn parse_payload_bytes(input: &[u8]) -> Result<Vec<IndexRecord>, MalformedRecordError> {
    let text = std::str::from_utf8(input).map_err(|err| MalformedRecordError::Syntax {
        line: 0,
        column: 0,
        message: format!("payload is not valid UTF-8: {err}"),
    })?;
    parse_payload(text)
}

/// Validates an already-parsed `{"docs": [...]}` value.
///
/// Stops at the first record that fails validation. A `Value` cannot carry
/// duplicate keys, so repeated `docs` entries are only caught by
/// [`parse_payload`] and [`read_records`].
pub fn records_from_value(value: Value) -> Result<Vec<IndexRecord>, MalformedRecordError> {
    let found = json_type_name(&value);
    let Value::Object(mut root) = value else {
        return Err(MalformedRecordError::TopLevel {
            message: format!("expected an object with a `docs` array, found {found}"),
        });
    };
    let docs = match root.remove("docs") {
        Some(Value::Array(docs)) => docs,
        Some(other) => {
            return Err(MalformedRecordError::TopLevel {
                message: format!("`docs` must be an array, found {}", json_type_name(&other)),
            })
        }
        None => {
            return Err(MalformedRecordError::TopLevel {
                message: "missing field `docs`".to_string(),
            })
        }
    };
    docs.into_iter()
        .enumerate()
        .map(|(index, value)| IndexRecord::from_value(index, value))
        .collect()
}

/// Strips a leading `var|let|const name =` assignment and a trailing `;`.
///
/// Input without an assignment is returned trimmed but otherwise untouched.
///
/// ```
/// use index_parser::strip_script_wrapper;
///
/// assert_eq!(strip_script_wrapper("var idx = {\"docs\":[]};\n"), "{\"docs\":[]}");
/// assert_eq!(strip_script_wrapper(" {\"docs\":[]} "), "{\"docs\":[]}");
/// ```
pub fn strip_script_wrapper(input: &str) -> &str {
    let trimmed = input.trim();
    let Some(body) = assignment_body(trimmed) else {
        return trimmed;
    };
    let body = body.trim();
    body.strip_suffix(';').map(str::trim_end).unwrap_or(body)
}

/// Renders records back into the bare `{"docs": [...]}` form.
pub fn to_payload(records: &[IndexRecord]) -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Payload<'a> {
        docs: &'a [IndexRecord],
    }
    serde_json::to_string(&Payload { docs: records })
}

pub use stream::{read_records, RecordStream, StreamError};

pub(crate) fn assignment_body(input: &str) -> Option<&str> {
    let rest = &input[script_keyword_len(input.as_bytes())?..];
    let (_, body) = rest.split_once('=')?;
    Some(body)
}

/// Length of a leading `var`, `let` or `const` that is followed by whitespace.
pub(crate) fn script_keyword_len(input: &[u8]) -> Option<usize> {
    SCRIPT_KEYWORDS
        .iter()
        .map(|keyword| keyword.as_bytes())
        .find(|keyword| {
            input
                .strip_prefix(*keyword)
                .and_then(|rest| rest.first())
                .is_some_and(u8::is_ascii_whitespace)
        })
        .map(<[u8]>::len)
}

fn take_string(
    fields: &mut Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<String, MalformedRecordError> {
    match fields.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(MalformedRecordError::WrongType {
            index,
            field,
            found: json_type_name(&other),
        }),
        None => Err(MalformedRecordError::MissingField { index, field }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
