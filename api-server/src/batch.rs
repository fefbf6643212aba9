//! Bulk writes under two consistency policies.
//!
//! Both bulk endpoints take the same body — a JSON array of `{key, value}`
//! entries — and differ only in how the queued SETs are executed. A malformed
//! entry rejects the whole batch before the store is touched; queuing an
//! undefined command on behalf of a half-formed entry is not an option.

use kvgate_store::resp::Frame;
use kvgate_store::{value, Command, StoreError, StoreHandle};
use serde_json::Value;

use crate::error::ApiError;

/// How a batch hits the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// One round trip, no atomicity: a failed entry leaves earlier entries
    /// applied.
    Pipelined,
    /// MULTI/EXEC: all entries apply, or none do.
    Transactional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub key: String,
    pub value: Value,
}

/// Validate the batch body. The body must be an array (possibly empty), and
/// every entry must be an object carrying a string `key` and a `value`.
pub fn parse_entries(body: &Value) -> Result<Vec<BatchEntry>, ApiError> {
    let Some(items) = body.as_array() else {
        return Err(ApiError::bad_request("batch body must be a JSON array"));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let Some(object) = item.as_object() else {
                return Err(ApiError::bad_request(format!(
                    "batch entry {index} must be an object"
                )));
            };
            let Some(key) = object.get("key").and_then(Value::as_str) else {
                return Err(ApiError::bad_request(format!(
                    "batch entry {index} is missing a string \"key\""
                )));
            };
            let Some(value) = object.get("value") else {
                return Err(ApiError::bad_request(format!(
                    "batch entry {index} is missing \"value\""
                )));
            };
            Ok(BatchEntry {
                key: key.to_string(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Parse and apply one batch. An empty batch succeeds without a store call.
pub async fn execute(store: &StoreHandle, body: &Value, policy: BatchPolicy) -> Result<(), ApiError> {
    let entries = parse_entries(body)?;
    if entries.is_empty() {
        return Ok(());
    }
    let commands: Vec<Command> = entries
        .iter()
        .map(|entry| Command::Set {
            key: entry.key.clone(),
            value: value::encode(&entry.value),
        })
        .collect();

    let mut lease = store.acquire().await?;
    match policy {
        BatchPolicy::Pipelined => {
            let replies = lease.pipeline(&commands).await?;
            for reply in replies {
                if let Frame::Error(message) = reply {
                    return Err(ApiError::Store(StoreError::Command(message)));
                }
            }
        }
        BatchPolicy::Transactional => {
            lease.transaction(&commands).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_batch_in_order() {
        let body = json!([
            {"key": "a", "value": 1},
            {"key": "b", "value": {"nested": true}},
        ]);
        let entries = parse_entries(&body).expect("valid batch");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "a");
        assert_eq!(entries[1].value, json!({"nested": true}));
    }

    #[test]
    fn empty_array_parses_to_no_entries() {
        assert!(parse_entries(&json!([])).expect("empty batch").is_empty());
    }

    #[test]
    fn non_array_bodies_are_client_errors() {
        for body in [json!({"key": "a", "value": 1}), json!("text"), json!(42)] {
            assert!(matches!(
                parse_entries(&body),
                Err(ApiError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn entries_missing_key_or_value_reject_the_whole_batch() {
        let missing_value = json!([{"key": "a", "value": 1}, {"key": "b"}]);
        assert!(matches!(
            parse_entries(&missing_value),
            Err(ApiError::BadRequest(_))
        ));

        let missing_key = json!([{"value": 1}]);
        assert!(matches!(
            parse_entries(&missing_key),
            Err(ApiError::BadRequest(_))
        ));

        let non_string_key = json!([{"key": 7, "value": 1}]);
        assert!(matches!(
            parse_entries(&non_string_key),
            Err(ApiError::BadRequest(_))
        ));
    }
}
