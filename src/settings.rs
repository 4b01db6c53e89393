//! Typed key-value settings persisted as flat `key=value` text
//!
//! The file format is line-oriented and human-editable: blank lines and
//! lines starting with `;` or `#` are comments, everything else is split on
//! the first `=`. Values are typed by inference when the file is read and
//! coerced through their text form when a caller asks for a specific type.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Encoded form of a carriage return inside a string value
const ESCAPE_CR: &str = "@\\r";
/// Encoded form of a line feed inside a string value
const ESCAPE_LF: &str = "@\\n";

/// Text form used when rendering and re-parsing timestamps
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored value. The variant is decided once, when the file is read;
/// callers coerce to the type they want through [`SettingsStore::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Timestamp(NaiveDateTime),
    Str(String),
}

impl Value {
    /// Infer a value from its raw text. The attempts run in a fixed order
    /// and the first match wins, so `42` is an Int16 and `2024-03-09` is a
    /// Timestamp but `2024` is not.
    pub fn infer(raw: &str) -> Value {
        if raw.eq_ignore_ascii_case("true") {
            Value::Bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Value::Bool(false)
        } else if raw.starts_with("[\"") && raw.ends_with("\"]") {
            // string-array syntax is recognized but not parsed; keep the raw text
            Value::Str(raw.to_string())
        } else if let Ok(v) = raw.parse::<i16>() {
            Value::Int16(v)
        } else if let Ok(v) = raw.parse::<i32>() {
            Value::Int32(v)
        } else if let Ok(v) = raw.parse::<i64>() {
            Value::Int64(v)
        } else if let Ok(v) = raw.parse::<u64>() {
            Value::UInt64(v)
        } else if let Some(ts) = parse_timestamp(raw) {
            Value::Timestamp(ts)
        } else {
            Value::Str(decode_escapes(raw))
        }
    }

    /// Plain text form, also the basis for cross-type coercion in `get`
    pub fn render(&self) -> String {
        match self {
            Value::Bool(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::UInt64(v) => v.to_string(),
            Value::Timestamp(v) => v.format(TIMESTAMP_FORMAT).to_string(),
            Value::Str(v) => v.clone(),
        }
    }

    /// Text form as written to the settings file. Strings get their CR/LF
    /// bytes re-encoded so a multi-line value stays on one line.
    fn render_line(&self) -> String {
        match self {
            Value::Str(v) => encode_escapes(v),
            other => other.render(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Substitute escapes until none remain. Decoding can expose new matches
/// when escapes are adjacent, hence the loop; it also means literal `@\r`
/// text in a stored string does not survive a round trip.
fn decode_escapes(raw: &str) -> String {
    let mut value = raw.to_string();
    while value.contains(ESCAPE_CR) || value.contains(ESCAPE_LF) {
        value = value.replace(ESCAPE_CR, "\r").replace(ESCAPE_LF, "\n");
    }
    value
}

fn encode_escapes(raw: &str) -> String {
    let mut value = raw.to_string();
    while value.contains('\r') || value.contains('\n') {
        value = value.replace('\r', ESCAPE_CR).replace('\n', ESCAPE_LF);
    }
    value
}

/// Conversion from a stored [`Value`] to a caller-requested type.
///
/// The set of implementations is the set of supported target types; asking
/// for anything else does not compile. Conversion goes through the value's
/// text form, so `get::<String>` of an Int16 yields `"42"` and
/// `get::<i32>` of a Str holding `"42"` yields 42.
pub trait FromValue: Default {
    fn from_value(value: &Value) -> Option<Self>
    where
        Self: Sized;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        // anything whose text starts with 't' counts as true
        Some(value.render().starts_with(['t', 'T']))
    }
}

macro_rules! integer_from_value {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: &Value) -> Option<Self> {
                value.render().parse().ok()
            }
        }
    )*};
}

integer_from_value!(i16, i32, i64, u64);

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Option<Self> {
        parse_timestamp(&value.render())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.render())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// In-memory key-value mapping with explicit load/save against a file path.
///
/// The store never saves on its own; callers decide when `write` runs.
#[derive(Debug, Default)]
pub struct SettingsStore {
    entries: BTreeMap<String, Value>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the mapping in memory; the file is untouched until `write`
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the mapping with the contents of `path`.
    ///
    /// Returns `Ok(false)` when the file does not exist (the mapping is left
    /// empty). Malformed lines are skipped, never an error. On duplicate
    /// keys the last line wins.
    pub fn read(&mut self, path: &Path) -> Result<bool> {
        self.entries.clear();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => {
                return Err(err)
                    .context(format!("Failed to read settings file {}", path.display()));
            }
        };

        for line in contents.lines() {
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            // the name is trimmed, the value never is
            self.entries.insert(name.to_string(), Value::infer(value));
        }

        Ok(true)
    }

    /// Serialize the whole mapping to `path`, replacing any existing file.
    /// A read-only permission bit on the old file is cleared first.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Ok(metadata) = fs::metadata(path) {
            let mut permissions = metadata.permissions();
            if permissions.readonly() {
                permissions.set_readonly(false);
                fs::set_permissions(path, permissions).context(format!(
                    "Failed to clear read-only attribute on {}",
                    path.display()
                ))?;
            }
            fs::remove_file(path)
                .context(format!("Failed to remove old settings file {}", path.display()))?;
        }

        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(&value.render_line());
            out.push('\n');
        }

        fs::write(path, out)
            .context(format!("Failed to write settings file {}", path.display()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Case-insensitive variant of [`contains`](Self::contains)
    pub fn contains_ignore_case(&self, key: &str) -> bool {
        self.entries.keys().any(|k| k.eq_ignore_ascii_case(key))
    }

    /// Delete `key`, returning the value it held
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Fetch `key` coerced to `T`. Absent keys and failed coercions both
    /// yield `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics when `key` is empty; that is a caller bug, not a data error.
    pub fn get<T: FromValue>(&self, key: &str) -> T {
        assert!(!key.is_empty(), "settings key must not be empty");
        self.entries
            .get(key)
            .and_then(T::from_value)
            .unwrap_or_default()
    }

    /// Insert or overwrite `key`, returning a reference to the stored value.
    ///
    /// # Panics
    ///
    /// Panics when `key` is empty.
    pub fn set<T: Into<Value>>(&mut self, key: &str, value: T) -> &Value {
        assert!(!key.is_empty(), "settings key must not be empty");
        self.entries.insert(key.to_string(), value.into());
        &self.entries[key]
    }
}
