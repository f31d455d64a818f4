// Root page: embedded gallery client

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn handle_root() -> Html<&'static str> {
    Html(INDEX_HTML)
}
