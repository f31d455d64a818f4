// Single image payload by remote key

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::server::error::{bad_request, internal_error, not_found};
use crate::server::ServerState;

#[derive(Deserialize)]
pub struct ImageQuery {
    pub key: Option<String>,
}

pub async fn handle_image(
    State(state): State<ServerState>,
    Query(params): Query<ImageQuery>,
) -> Response {
    let Some(key) = params.key.as_deref().filter(|k| !k.is_empty()) else {
        return bad_request("Missing key parameter").into_response();
    };

    match state.gallery.image_payload(key).await {
        Ok(Some(bytes)) if !bytes.is_empty() => {
            ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
        }
        Ok(_) => not_found("Image not found").into_response(),
        Err(e) => {
            log::error!("[Image] fetch failed for {}: {:#}", key, e);
            internal_error("Failed to fetch image").into_response()
        }
    }
}
