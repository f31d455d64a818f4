// Status handler: server and cache introspection

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::server::ServerState;

pub async fn handle_status(State(state): State<ServerState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let response = json!({
        "server": {
            "version": state.config.version,
            "uptime_seconds": uptime,
            "owner": state.config.owner,
        },
        "cache": {
            "anchor": state.gallery.estimated_total().await,
            "active_sessions": state.gallery.session_count(),
        }
    });
    (StatusCode::OK, axum::Json(response))
}
