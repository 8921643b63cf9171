use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

// Landing page and widget script, embedded at compile time
#[derive(RustEmbed)]
#[folder = "static"]
pub struct PageAssets;

/// Serve the landing page from embedded assets with fallback to index.html
pub async fn serve_page(uri: Uri) -> Response {
    serve_embedded::<PageAssets>(uri).await
}

async fn serve_embedded<E: RustEmbed>(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // If path is empty, serve index.html
    let path = if path.is_empty() { "index.html" } else { path };

    match E::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        // Unknown API paths are real 404s; anything else gets the page
        None if path.starts_with("api/") => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        None => match E::get("index.html") {
            Some(content) => ([(header::CONTENT_TYPE, "text/html")], content.data).into_response(),
            None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        },
    }
}
