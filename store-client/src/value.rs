//! How JSON values become stored strings and back.
//!
//! The store only holds strings; clients of the HTTP surface send arbitrary
//! JSON. Values are stored as their compact JSON text. Decoding falls back to
//! a plain string value when the stored text is not JSON, so data written by
//! other clients stays readable instead of erroring a whole response.

use serde_json::Value;

/// Serialize a JSON value to its stored representation.
pub fn encode(value: &Value) -> String {
    value.to_string()
}

/// Parse a stored representation back into a JSON value.
pub fn decode(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_round_trip() {
        for value in [
            Value::Null,
            json!(true),
            json!(42),
            json!(1.5),
            json!("text"),
            json!(["a", 1, null]),
            json!({"nested": {"key": "value"}}),
        ] {
            assert_eq!(decode(&encode(&value)), value);
        }
    }

    #[test]
    fn non_json_text_decodes_as_a_string() {
        assert_eq!(decode("plain text"), json!("plain text"));
    }

    #[test]
    fn json_string_keeps_its_quotes_distinct_from_raw_text() {
        // "\"x\"" was stored by us (a JSON string); "x" was stored by someone
        // else. Both must come back as the string "x".
        assert_eq!(decode("\"x\""), json!("x"));
        assert_eq!(decode("x"), json!("x"));
    }
}
