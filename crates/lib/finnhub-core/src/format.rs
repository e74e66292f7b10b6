use serde_json::Value;

/// Pretty-prints `raw` as two-space indented JSON.
///
/// Bodies that are not JSON come back unchanged (lossy for invalid UTF-8);
/// that pass-through is not an error.
///
/// # Errors
/// Returns the serializer error if a parsed value cannot be written back out.
pub fn format_body(raw: &[u8]) -> Result<String, serde_json::Error> {
    serde_json::from_slice::<Value>(raw).map_or_else(
        |_| Ok(String::from_utf8_lossy(raw).into_owned()),
        |value| serde_json::to_string_pretty(&value),
    )
}
