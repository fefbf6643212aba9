//! The endpoint table.

use axum::routing::{get, post};
use axum::Router;
use kvgate_store::StoreHandle;
use tower_http::trace::TraceLayer;

use crate::handlers;

pub fn router(store: StoreHandle) -> Router {
    Router::new()
        .route("/redis", post(handlers::create_entry))
        .route("/redis/:key", get(handlers::fetch_entry))
        .route(
            "/key-value/:key",
            post(handlers::put_keyed_entry)
                .put(handlers::put_keyed_entry)
                .get(handlers::fetch_entry)
                .delete(handlers::remove_entry),
        )
        .route(
            "/keys",
            get(handlers::list_keys).delete(handlers::flush_keys),
        )
        .route("/pipeline", post(handlers::run_pipeline))
        .route("/transaction", post(handlers::run_transaction))
        .route(
            "/list/:key",
            post(handlers::push_list).get(handlers::fetch_list),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
