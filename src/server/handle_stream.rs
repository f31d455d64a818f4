// Streaming variant of the image listing (server-sent events)

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::progress::{ChannelSink, StreamEvent};
use crate::server::handle_images::clamp_per_page;
use crate::server::ServerState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub search: Option<String>,
}

/// Same contract as the JSON endpoint, delivered as an event stream: zero
/// or more `progress` events while the drain runs, then exactly one
/// terminal `complete` or `error` event. The connection stays open for the
/// whole drain.
pub async fn handle_images_stream(
    State(state): State<ServerState>,
    Query(params): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = clamp_per_page(params.per_page);
    let search = params.search.filter(|s| !s.is_empty());

    let (tx, rx) = mpsc::unbounded_channel();
    let gallery = Arc::clone(&state.gallery);
    tokio::spawn(async move {
        let sink = ChannelSink::new(tx.clone());
        let result = match search.as_deref() {
            Some(term) => gallery.search(term, page, per_page, &sink).await,
            None => gallery.page(page, per_page, &sink).await,
        };
        let terminal = match result {
            Ok(result) => StreamEvent::Complete(result),
            Err(e) => {
                log::error!("[Stream] fetch failed: {:#}", e);
                StreamEvent::Error {
                    error: "Failed to fetch images".to_string(),
                }
            }
        };
        let _ = tx.send(terminal);
        // Dropping the last sender ends the stream after the terminal event.
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok(to_sse_event(event)), rx))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: StreamEvent) -> Event {
    let built = match &event {
        StreamEvent::Progress { status, count } => Event::default()
            .event("progress")
            .json_data(json!({"status": status, "count": count})),
        StreamEvent::Complete(result) => Event::default().event("complete").json_data(result),
        StreamEvent::Error { error } => Event::default()
            .event("error")
            .json_data(json!({"error": error})),
    };
    built.unwrap_or_else(|e| {
        log::error!("[Stream] event serialization failed: {}", e);
        Event::default()
            .event("error")
            .data(r#"{"error":"Failed to serialize event"}"#)
    })
}
