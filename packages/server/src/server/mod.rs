// HTTP server setup (Axum + embedded page)
pub mod app;
pub mod routes;
pub mod sessions;
pub mod static_files;

pub use app::*;
pub use sessions::{Session, SessionRegistry};
