// Image listing: windowed pages, search, and cursor-session continuation

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::constants;
use crate::progress::LogSink;
use crate::server::error::{internal_error, not_found};
use crate::server::ServerState;
use crate::session::SessionOutcome;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub search: Option<String>,
    pub session_id: Option<String>,
    pub limit: Option<usize>,
}

pub fn clamp_per_page(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(constants::DEFAULT_PER_PAGE)
        .clamp(1, constants::MAX_PER_PAGE)
}

/// A session token selects the forward-cursor path, a bare `limit` opens a
/// new session, everything else goes through newest-first windowing (with
/// `search` routing through the full drain).
pub async fn handle_images(
    State(state): State<ServerState>,
    Query(params): Query<ImagesQuery>,
) -> Response {
    if let Some(token) = params.session_id.as_deref() {
        return continue_session(&state, token).await;
    }
    if let Some(limit) = params.limit {
        return open_session(&state, limit).await;
    }

    let page = params.page.unwrap_or(1).max(1);
    let per_page = clamp_per_page(params.per_page);
    let search = params.search.as_deref().filter(|s| !s.is_empty());

    let result = match search {
        Some(term) => state.gallery.search(term, page, per_page, &LogSink).await,
        None => state.gallery.page(page, per_page, &LogSink).await,
    };

    match result {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(e) => {
            log::error!("[Images] fetch failed: {:#}", e);
            internal_error("Failed to fetch images").into_response()
        }
    }
}

async fn open_session(state: &ServerState, limit: usize) -> Response {
    let per_page = limit.clamp(1, constants::MAX_PER_PAGE);
    match state.gallery.open_session(per_page).await {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(e) => {
            log::error!("[Session] create failed: {:#}", e);
            internal_error("Failed to fetch images").into_response()
        }
    }
}

async fn continue_session(state: &ServerState, token: &str) -> Response {
    match state.gallery.continue_session(token).await {
        Ok(SessionOutcome::Page(page)) => (StatusCode::OK, axum::Json(page)).into_response(),
        Ok(SessionOutcome::NotFound) => {
            not_found("Session not found or expired").into_response()
        }
        Err(e) => {
            log::error!("[Session] advance failed: {:#}", e);
            internal_error("Failed to fetch images").into_response()
        }
    }
}
