// HTTP server exposing the gallery API

mod config;
mod error;
mod handle_image;
mod handle_images;
mod handle_root;
mod handle_status;
mod handle_stream;
mod routes;
mod startup;

pub use config::ServerConfig;
pub use routes::create_router;
pub use startup::{start_server, StartupConfig};

use crate::gallery::Gallery;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ServerState {
    pub gallery: Arc<Gallery>,
    pub config: ServerConfig,
    pub start_time: Instant,
}
