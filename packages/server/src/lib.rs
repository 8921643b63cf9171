// Online Presence Analyzer - Server Core
//
// This crate provides the backend for the local-SEO presence analyzer: a
// search-grounded Gemini call behind a per-visitor widget, anonymous
// identities, and an append-only log of past analyses.
//
// Domain logic lives in domains/*; external services sit behind the
// Base* traits in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
