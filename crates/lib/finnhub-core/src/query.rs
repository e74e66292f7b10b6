//! Argument binding and query-string assembly.

use serde_json::{Map, Number, Value};
use url::form_urlencoded::byte_serialize;

use crate::config::QueryEncoding;
use crate::descriptor::ParameterSpec;

/// Collects `(key, value)` pairs for every declared parameter present in
/// `args`, in declared order.
///
/// Missing keys and `null` values are skipped. Required-ness is not checked
/// here.
#[must_use]
pub fn bind(args: &Map<String, Value>, specs: &[ParameterSpec]) -> Vec<(String, String)> {
    specs
        .iter()
        .filter_map(|spec| {
            let value = args.get(&spec.key)?;
            stringify(value).map(|text| (spec.key.clone(), text))
        })
        .collect()
}

/// Renders pairs as `?k1=v1&k2=v2`, or an empty string when there are none.
#[must_use]
pub fn build(pairs: &[(String, String)], encoding: QueryEncoding) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let joined = pairs
        .iter()
        .map(|(key, value)| match encoding {
            QueryEncoding::Verbatim => format!("{key}={value}"),
            QueryEncoding::Encoded => format!("{}={}", encode(key), encode(value)),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}

fn encode(text: &str) -> String {
    byte_serialize(text.as_bytes()).collect()
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number_text(number)),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

// Integral floats print without a trailing `.0` so `25000.0` and `25000`
// produce the same query.
#[allow(clippy::float_cmp)]
fn number_text(number: &Number) -> String {
    if number.is_f64()
        && let Some(float) = number.as_f64()
        && float.is_finite()
        && float.fract() == 0.0
    {
        // `+ 0.0` folds `-0.0` into `0`.
        return format!("{:.0}", float + 0.0);
    }
    number.to_string()
}
