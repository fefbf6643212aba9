//! One handler per endpoint: check presence, acquire a lease, issue the
//! store command, shape the JSON reply.

use axum::extract::{Path, State};
use axum::Json;
use kvgate_store::{value, StoreHandle};
use serde_json::{json, Map, Value};

use crate::batch::{self, BatchPolicy};
use crate::error::ApiError;

/// `POST /redis` — body carries both `key` and `value`.
pub async fn create_entry(
    State(store): State<StoreHandle>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let object = require_object(&body)?;
    let Some(key) = object.get("key").and_then(Value::as_str) else {
        return Err(ApiError::bad_request("missing string field \"key\""));
    };
    let Some(entry_value) = object.get("value") else {
        return Err(ApiError::bad_request("missing field \"value\""));
    };
    let mut lease = store.acquire().await?;
    lease.set(key, &value::encode(entry_value)).await?;
    Ok(Json(json!("OK")))
}

/// `POST`/`PUT /key-value/:key` — the path carries the key.
pub async fn put_keyed_entry(
    State(store): State<StoreHandle>,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let object = require_object(&body)?;
    let Some(entry_value) = object.get("value") else {
        return Err(ApiError::bad_request("missing field \"value\""));
    };
    let mut lease = store.acquire().await?;
    lease.set(&key, &value::encode(entry_value)).await?;
    Ok(Json(json!("OK")))
}

/// `GET /redis/:key` and `GET /key-value/:key` — a missing key maps to JSON
/// null, never an error.
pub async fn fetch_entry(
    State(store): State<StoreHandle>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut lease = store.acquire().await?;
    let stored = lease.get(&key).await?;
    let entry_value = stored
        .map(|raw| value::decode(&raw))
        .unwrap_or(Value::Null);

    let mut reply = Map::new();
    reply.insert(key, entry_value);
    Ok(Json(Value::Object(reply)))
}

/// `DELETE /key-value/:key` — deleting an absent key is still a success.
pub async fn remove_entry(
    State(store): State<StoreHandle>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut lease = store.acquire().await?;
    lease.del(&key).await?;
    Ok(Json(json!("OK")))
}

/// `GET /keys`
pub async fn list_keys(State(store): State<StoreHandle>) -> Result<Json<Value>, ApiError> {
    let mut lease = store.acquire().await?;
    let keys = lease.keys("*").await?;
    Ok(Json(json!(keys)))
}

/// `DELETE /keys` — flushes the whole store.
pub async fn flush_keys(State(store): State<StoreHandle>) -> Result<Json<Value>, ApiError> {
    let mut lease = store.acquire().await?;
    lease.flush_all().await?;
    Ok(Json(json!("OK")))
}

/// `POST /list/:key` — body `{value: [...]}`; elements are prepended in
/// submitted order, so the last element ends up at the head.
pub async fn push_list(
    State(store): State<StoreHandle>,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let object = require_object(&body)?;
    let Some(elements) = object.get("value").and_then(Value::as_array) else {
        return Err(ApiError::bad_request("field \"value\" must be an array"));
    };
    let encoded: Vec<String> = elements.iter().map(value::encode).collect();
    let mut lease = store.acquire().await?;
    lease.lpush(&key, encoded).await?;
    Ok(Json(json!("OK")))
}

/// `GET /list/:key` — the full list, head first.
pub async fn fetch_list(
    State(store): State<StoreHandle>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut lease = store.acquire().await?;
    let items = lease.lrange(&key, 0, -1).await?;
    let decoded: Vec<Value> = items.iter().map(|raw| value::decode(raw)).collect();
    Ok(Json(Value::Array(decoded)))
}

/// `POST /pipeline`
pub async fn run_pipeline(
    State(store): State<StoreHandle>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    batch::execute(&store, &body, BatchPolicy::Pipelined).await?;
    Ok(Json(json!("OK")))
}

/// `POST /transaction`
pub async fn run_transaction(
    State(store): State<StoreHandle>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    batch::execute(&store, &body, BatchPolicy::Transactional).await?;
    Ok(Json(json!("OK")))
}

fn require_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::bad_request("request body must be a JSON object"))
}
