//! Server dependencies for the analyzer (using traits for testability)
//!
//! This module provides the central dependency container handed to every
//! session's widget. All external services use trait abstractions so tests
//! can swap in the mocks from `test_dependencies`.

use std::sync::Arc;

use crate::domains::analyzer::{AnalyzerSettings, MarkupRenderer};
use crate::kernel::{BaseDocumentStore, BaseIdentityProvider, BaseTextGenerator};

// =============================================================================
// ServerDeps
// =============================================================================

#[derive(Clone)]
pub struct ServerDeps {
    /// Search-grounded generator (Gemini in production)
    pub text_generator: Arc<dyn BaseTextGenerator>,
    /// Append-only record store (Firestore or in-memory)
    pub document_store: Arc<dyn BaseDocumentStore>,
    /// Anonymous sign-in, run once per session
    pub identity_provider: Arc<dyn BaseIdentityProvider>,
    pub markup_renderer: Arc<dyn MarkupRenderer>,
    pub analyzer_settings: AnalyzerSettings,
}

impl ServerDeps {
    pub fn new(
        text_generator: Arc<dyn BaseTextGenerator>,
        document_store: Arc<dyn BaseDocumentStore>,
        identity_provider: Arc<dyn BaseIdentityProvider>,
        markup_renderer: Arc<dyn MarkupRenderer>,
        analyzer_settings: AnalyzerSettings,
    ) -> Self {
        Self {
            text_generator,
            document_store,
            identity_provider,
            markup_renderer,
            analyzer_settings,
        }
    }
}
