use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::db;
use crate::state::AppState;

/// GET /ping
/// Liveness plus a database round trip. Always 200; the `database` field
/// reports whether SQLite answered.
pub async fn ping_handler(State(state): State<AppState>) -> Json<Value> {
    let database = if db::is_reachable(&state.db).await {
        "reachable"
    } else {
        "unreachable"
    };

    Json(json!({
        "message": "pong",
        "database": database,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
