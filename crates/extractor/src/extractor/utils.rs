use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::extractor::error::ExtractorError;

#[inline]
pub fn capture_name<'a>(re: &Regex, name: &str, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.name(name))
        .map(|m| m.as_str())
}

#[inline]
pub fn capture_name_or_invalid_url<'a>(
    re: &Regex,
    name: &str,
    input: &'a str,
) -> Result<&'a str, ExtractorError> {
    capture_name(re, name, input).ok_or_else(|| ExtractorError::InvalidUrl(input.to_string()))
}

/// Reads a number that may arrive either as a JSON number or a numeric string.
#[inline]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        Some(n)
    } else if let Some(s) = value.as_str() {
        s.trim().parse::<f64>().ok()
    } else {
        None
    }
}

/// serde adapter for optional numeric fields with loose typing.
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    Ok(opt.as_ref().and_then(value_as_f64))
}

/// Collapses runs of whitespace (including newlines from markup) into single spaces.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips `prefix` from the start of `text`, ignoring ASCII case, and trims the rest.
pub fn strip_label_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    let text = text.trim();
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => text[prefix.len()..].trim(),
        _ => text,
    }
}
