// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::{
    BaseClipboard, BaseDocumentStore, BaseIdentityProvider, BaseTextGenerator, ServerDeps,
};
use crate::domains::analyzer::models::{AnalysisRecord, CollectionPath};
use crate::domains::analyzer::{AnalyzerSettings, MarkdownLite};
use crate::domains::identity::{Identity, UserId};

// =============================================================================
// Mock Text Generator
// =============================================================================

/// Arguments captured from a generate call
#[derive(Debug, Clone)]
pub struct GenerateCall {
    pub system_instruction: String,
    pub user_query: String,
}

pub struct MockTextGenerator {
    responses: Arc<Mutex<Vec<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<GenerateCall>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Calls block until [`release`](Self::release) grants them, so tests can
    /// observe the in-flight state.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    /// Queue a successful response
    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().unwrap().push(Ok(text.to_string()));
        self
    }

    /// Queue a failure (as if every retry had been spent)
    pub fn with_failure(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Let `count` gated calls proceed
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    pub fn calls(&self) -> Vec<GenerateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseTextGenerator for MockTextGenerator {
    async fn generate_grounded(
        &self,
        system_instruction: &str,
        user_query: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        // Record the call
        self.calls.lock().unwrap().push(GenerateCall {
            system_instruction: system_instruction.to_string(),
            user_query: user_query.to_string(),
        });

        if let Some(gate) = &self.gate {
            tokio::select! {
                _ = cancel.cancelled() => anyhow::bail!("cancelled"),
                permit = gate.acquire() => permit?.forget(),
            }
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok("Mock analysis\n* **Claim** your listing".to_string());
        }
        responses.remove(0).map_err(|message| anyhow::anyhow!(message))
    }
}

// =============================================================================
// Mock Document Store
// =============================================================================

/// Arguments captured from an append call
#[derive(Debug, Clone)]
pub struct AppendCall {
    pub user_id: UserId,
    pub collection: CollectionPath,
    pub record: AnalysisRecord,
}

pub struct MockDocumentStore {
    calls: Arc<Mutex<Vec<AppendCall>>>,
    failure: Option<String>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Every append records the call, then fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn append_calls(&self) -> Vec<AppendCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseDocumentStore for MockDocumentStore {
    async fn append(
        &self,
        identity: &Identity,
        collection: &CollectionPath,
        record: &AnalysisRecord,
    ) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(AppendCall {
            user_id: identity.user_id.clone(),
            collection: collection.clone(),
            record: record.clone(),
        });

        match &self.failure {
            Some(message) => anyhow::bail!("{}", message),
            None => Ok(format!("mock-doc-{}", calls.len())),
        }
    }
}

// =============================================================================
// Mock Identity Provider
// =============================================================================

enum SignInBehavior {
    Succeed(String),
    Fail(String),
    Hang,
}

pub struct MockIdentityProvider {
    behavior: SignInBehavior,
    sign_ins: Arc<Mutex<usize>>,
}

impl MockIdentityProvider {
    pub fn new(user_id: &str) -> Self {
        Self::with_behavior(SignInBehavior::Succeed(user_id.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_behavior(SignInBehavior::Fail(message.to_string()))
    }

    /// Sign-in never completes; the identity stays pending.
    pub fn pending() -> Self {
        Self::with_behavior(SignInBehavior::Hang)
    }

    fn with_behavior(behavior: SignInBehavior) -> Self {
        Self {
            behavior,
            sign_ins: Arc::new(Mutex::new(0)),
        }
    }

    pub fn sign_in_count(&self) -> usize {
        *self.sign_ins.lock().unwrap()
    }
}

#[async_trait]
impl BaseIdentityProvider for MockIdentityProvider {
    async fn sign_in_anonymously(&self) -> Result<Identity> {
        *self.sign_ins.lock().unwrap() += 1;

        match &self.behavior {
            SignInBehavior::Succeed(user_id) => Ok(Identity::new(UserId::new(user_id.as_str()))),
            SignInBehavior::Fail(message) => anyhow::bail!("{}", message),
            SignInBehavior::Hang => std::future::pending().await,
        }
    }
}

// =============================================================================
// Mock Clipboard
// =============================================================================

pub struct MockClipboard {
    contents: Arc<Mutex<Option<String>>>,
    failure: Option<String>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(Mutex::new(None)),
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

impl Default for MockClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseClipboard for MockClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub text_generator: Arc<MockTextGenerator>,
    pub document_store: Arc<MockDocumentStore>,
    pub identity_provider: Arc<MockIdentityProvider>,
    pub settings: AnalyzerSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            text_generator: Arc::new(MockTextGenerator::new()),
            document_store: Arc::new(MockDocumentStore::new()),
            identity_provider: Arc::new(MockIdentityProvider::new("anon-test")),
            settings: AnalyzerSettings::default(),
        }
    }

    /// Set a mock text generator
    pub fn mock_generator(mut self, generator: MockTextGenerator) -> Self {
        self.text_generator = Arc::new(generator);
        self
    }

    /// Set a mock document store
    pub fn mock_store(mut self, store: MockDocumentStore) -> Self {
        self.document_store = Arc::new(store);
        self
    }

    /// Set a mock identity provider
    pub fn mock_identity(mut self, provider: MockIdentityProvider) -> Self {
        self.identity_provider = Arc::new(provider);
        self
    }

    pub fn settings(mut self, settings: AnalyzerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build ServerDeps backed by these mocks and the Markdown-lite renderer
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.text_generator.clone(),
            self.document_store.clone(),
            self.identity_provider.clone(),
            Arc::new(MarkdownLite),
            self.settings.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
