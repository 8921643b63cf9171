// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The analyzer widget is written against these so that tests can swap in
// the mocks from test_dependencies.
//
// Naming convention: Base* for trait names (e.g., BaseTextGenerator)

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domains::analyzer::models::{AnalysisRecord, CollectionPath};
use crate::domains::identity::Identity;

// =============================================================================
// Text Generation Trait (Infrastructure - search-grounded LLM)
// =============================================================================

#[async_trait]
pub trait BaseTextGenerator: Send + Sync {
    /// Generate text grounded in live web search.
    ///
    /// Implementations own their retry policy; an error means the call is
    /// over. Must return promptly once `cancel` fires.
    async fn generate_grounded(
        &self,
        system_instruction: &str,
        user_query: &str,
        cancel: &CancellationToken,
    ) -> Result<String>;
}

// =============================================================================
// Identity Provider Trait (Infrastructure - anonymous auth)
// =============================================================================

#[async_trait]
pub trait BaseIdentityProvider: Send + Sync {
    /// Create a fresh anonymous identity.
    async fn sign_in_anonymously(&self) -> Result<Identity>;
}

// =============================================================================
// Document Store Trait (Infrastructure - append-only log)
// =============================================================================

#[async_trait]
pub trait BaseDocumentStore: Send + Sync {
    /// Append a record to a collection. The store assigns `createdAt`.
    /// Returns the new document id.
    async fn append(
        &self,
        identity: &Identity,
        collection: &CollectionPath,
        record: &AnalysisRecord,
    ) -> Result<String>;
}

// =============================================================================
// Clipboard Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseClipboard: Send + Sync {
    /// Place text on the clipboard.
    async fn write_text(&self, text: &str) -> Result<()>;
}
