//! Explicit coercions from loosely-typed input values to literal lexical forms.

use chrono::NaiveDateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Everything except RFC 3986 unreserved characters is escaped.
///
/// `/` is escaped too, so `a/b` stays one path segment (`a%2Fb`). IRIs minted
/// for such columns differ from pipelines that leave `/` unescaped.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const ISO_LOCAL: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a JSON number or numeric string as `f64`.
///
/// Strings are trimmed before parsing. Returns `None` for anything else,
/// including the empty string.
pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Magnitudes outside `[1e-6, 1e16)` are written in exponent form.
const DECIMAL_MIN: f64 = 1e-6;
const DECIMAL_MAX: f64 = 1e16;

/// Lexical form of an `xsd:float`.
///
/// Integral values keep one decimal place (`3.0`), matching what
/// downstream consumers already receive. Values beyond the `xsd:float`
/// range become `INF`/`-INF`.
pub fn float_lexical(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_nan() {
        "NaN".to_string()
    } else if magnitude > f32::MAX as f64 {
        let infinity = if value > 0.0 { "INF" } else { "-INF" };
        infinity.to_string()
    } else if magnitude != 0.0 && !(DECIMAL_MIN..DECIMAL_MAX).contains(&magnitude) {
        format!("{:e}", value)
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Text of a scalar value for a plain literal. `None` for arrays and objects.
pub fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reformat a timestamp in `format` as ISO-8601 local date-time.
///
/// A space in `format` must match at least one whitespace character, and no
/// leading or trailing whitespace is accepted.
pub fn canonical_timestamp(raw: &str, format: &str) -> Option<String> {
    if raw.trim() != raw || raw.split_whitespace().count() != format.split_whitespace().count() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, format)
        .ok()
        .map(|dt| dt.format(ISO_LOCAL).to_string())
}

/// Percent-encode a column name for use as a URI path segment.
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ESCAPES).to_string()
}

/// Render a raw value for error messages.
pub fn describe(value: &Value) -> String {
    value.to_string()
}
