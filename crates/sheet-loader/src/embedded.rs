//! Schema-tolerant parsing of embedded structured cells.
//!
//! Cells may carry a JSON object, a JSON list, or (for curator socials
//! only) a pipe-delimited `key:value` sequence. The result is a tagged
//! variant so callers must handle the no-structured-data case explicitly.

use serde_json::Value;

/// Outcome of parsing an embedded structured cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Embedded {
    /// A JSON object.
    Object(Value),
    /// Pipe-delimited `key:value` pairs; the first colon splits each entry.
    Pairs(Vec<(String, String)>),
    /// No structured data could be recovered.
    Unparsed,
}

impl Embedded {
    /// String value under `key`, across either encoding.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Embedded::Object(obj) => obj.get(key).and_then(Value::as_str),
            Embedded::Pairs(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Embedded::Unparsed => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self, Embedded::Unparsed)
    }
}

/// Strict variant: JSON object or nothing. Used for fields with no
/// fallback encoding.
pub fn parse_object(raw: &str) -> Embedded {
    match serde_json::from_str::<Value>(raw) {
        Ok(v) if v.is_object() => Embedded::Object(v),
        _ => Embedded::Unparsed,
    }
}

/// Tolerant variant for curator socials: JSON object first; if the cell is
/// not JSON at all, fall back to pipe-delimited pairs. Valid JSON of the
/// wrong shape does not fall through to the pair encoding.
pub fn parse_object_or_pairs(raw: &str) -> Embedded {
    match serde_json::from_str::<Value>(raw) {
        Ok(v) if v.is_object() => Embedded::Object(v),
        Ok(_) => Embedded::Unparsed,
        Err(_) => {
            let pairs = parse_pairs(raw);
            if pairs.is_empty() {
                Embedded::Unparsed
            } else {
                Embedded::Pairs(pairs)
            }
        }
    }
}

/// JSON-list cell to its items; `None` when the cell is not a list.
pub fn parse_array(raw: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('|')
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
