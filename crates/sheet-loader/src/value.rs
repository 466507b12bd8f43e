//! Scalar coercion for loosely-typed snapshot cells.

use chrono::{DateTime, Utc};

/// Parse a money-like cell: plain number, or a string with `$` and `,`.
/// Failure coerces to 0.0.
pub fn parse_money(raw: &str) -> f64 {
    raw.trim()
        .replace('$', "")
        .replace(',', "")
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Parse a numeric cell, defaulting to 0.0.
pub fn parse_f64(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Parse a numeric cell where absence matters: empty or unparseable cells
/// yield `None`, never zero.
pub fn parse_f64_opt(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

pub fn parse_bool(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("true") || raw == "1"
}

/// Unix-second cell to a timestamp; invalid cells yield `None`.
pub fn parse_unix_ts(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.trim().parse::<f64>().ok()?;
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
}

/// Keys and addresses are compared as opaque, case-normalized strings.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Compact USD display: `$1.2M`, `$3.4K`, `$12.34`, `$0`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "$0".to_string();
    }
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${value:.2}")
    }
}

/// Percent display with an em-dash for absent values.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => "—".to_string(),
    }
}
