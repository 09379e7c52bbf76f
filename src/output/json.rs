use serde_json::{Map, Value};

/// An untyped JSON object as emitted by a backend.
pub type RawRecord = Map<String, Value>;

/// Structured interpretation of captured output.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    Object(RawRecord),
    Array(Vec<RawRecord>),
    /// Newline-delimited objects.
    Lines(Vec<RawRecord>),
}

impl Structured {
    /// Flatten into a list of records; a lone object is a list of one.
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            Structured::Object(obj) => vec![obj],
            Structured::Array(list) | Structured::Lines(list) => list,
        }
    }
}

/// Best-effort structured decoding of backend output.
///
/// Tries a single object, then an array of objects, then newline-delimited
/// objects. Anything else yields `None` so callers can treat the text as
/// opaque.
pub fn decode(text: &str) -> Option<Structured> {
    decode_object(text)
        .map(Structured::Object)
        .or_else(|| decode_array(text).map(Structured::Array))
        .or_else(|| decode_lines(text).map(Structured::Lines))
}

/// Decode all records in `text`, or an empty list if it is not structured.
pub fn decode_records(text: &str) -> Vec<RawRecord> {
    decode(text).map(Structured::into_records).unwrap_or_default()
}

pub fn decode_object(text: &str) -> Option<RawRecord> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

pub fn decode_array(text: &str) -> Option<Vec<RawRecord>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Decode newline-delimited objects. Every non-blank line must be an object;
/// a single bad line rejects the whole text rather than returning a partial
/// list.
pub fn decode_lines(text: &str) -> Option<Vec<RawRecord>> {
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('{') {
            return None;
        }
        records.push(serde_json::from_str(line).ok()?);
    }
    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}
