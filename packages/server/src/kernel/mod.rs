//! Kernel module - server infrastructure and dependencies.

pub mod clipboard;
pub mod deps;
pub mod firebase_auth;
pub mod firestore;
pub mod gemini;
pub mod memory_store;
pub mod test_dependencies;
pub mod traits;

pub use clipboard::CapturedClipboard;
pub use deps::ServerDeps;
pub use firebase_auth::{FirebaseAnonymousAuth, LocalIdentityProvider};
pub use firestore::FirestoreDocumentStore;
pub use gemini::GeminiTextGenerator;
pub use memory_store::InMemoryDocumentStore;
pub use test_dependencies::TestDependencies;
pub use traits::*;
