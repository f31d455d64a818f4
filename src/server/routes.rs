// Route setup and configuration

use crate::gallery::Gallery;
use crate::server::config::ServerConfig;
use crate::server::{
    handle_image::handle_image, handle_images::handle_images, handle_root::handle_root,
    handle_status::handle_status, handle_stream::handle_images_stream,
};
use crate::server::ServerState;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub fn create_router(gallery: Arc<Gallery>, config: ServerConfig, start_time: Instant) -> Router {
    Router::new()
        .route("/", axum::routing::get(handle_root))
        .route("/api/images", axum::routing::get(handle_images))
        .route("/api/images/stream", axum::routing::get(handle_images_stream))
        .route("/api/image", axum::routing::get(handle_image))
        .route("/api/status", axum::routing::get(handle_status))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(ServerState {
            gallery,
            config,
            start_time,
        })
}
