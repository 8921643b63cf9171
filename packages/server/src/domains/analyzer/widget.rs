//! The Online Presence Analyzer widget.
//!
//! A headless state machine owning the two input fields, the current result,
//! the error line, and the copy confirmation. One widget serves one visitor;
//! it runs at most one analysis at a time.
//!
//! ```text
//! Idle ──submit──► (validate) ──► Requesting ──► Success
//!   ▲                 │                    └───► Failure
//!   └─── rejected ────┘        (Success/Failure accept the next submit)
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::markdown::MarkupRenderer;
use super::models::{
    AnalysisRecord, AnalysisRequest, AnalysisResult, CollectionPath, ValidationError,
};
use super::persistence::spawn_record_write;
use super::prompts;
use crate::domains::identity::{Identity, IdentityState, IdentityWatch};
use crate::kernel::{BaseClipboard, BaseDocumentStore, BaseTextGenerator, ServerDeps};

/// Shown for every failed analysis; upstream detail only goes to the log.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. This can happen if the business is \
not found or the AI is busy. Please try again.";

/// How long the "Copied!" confirmation stays visible.
pub const COPY_CONFIRMATION_DURATION: Duration = Duration::from_secs(2);

/// Widget-level settings shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Namespace for persisted records
    pub app_id: String,
    /// Pre-filled location field
    pub default_location: String,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            app_id: "default-app-id".to_string(),
            default_location: "Lucknow".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Requesting,
    Success,
    Failure,
}

/// What a call to [`AnalyzerWidget::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Result displayed; a record write was started
    Completed(AnalysisResult),
    /// Refused before any network call
    Rejected(ValidationError),
    /// A request is already in flight; nothing happened
    Busy,
    /// The generator gave up; the generic failure message is displayed
    Failed,
    /// The widget was torn down while the request was in flight
    Cancelled,
}

/// Serializable snapshot of everything the widget displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub business_name: String,
    pub location: String,
    pub phase: Phase,
    pub is_loading: bool,
    pub submit_enabled: bool,
    pub identity_ready: bool,
    /// Sign-in failed for good; the session can never submit
    pub identity_failed: bool,
    pub error: Option<String>,
    pub result_markup: Option<String>,
    pub copy_success: bool,
}

#[derive(Debug)]
struct WidgetState {
    business_name: String,
    location: String,
    phase: Phase,
    error: Option<String>,
    result: Option<AnalysisResult>,
    copied_at: Option<Instant>,
}

impl WidgetState {
    fn copy_success(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPY_CONFIRMATION_DURATION)
    }
}

pub struct AnalyzerWidget {
    generator: Arc<dyn BaseTextGenerator>,
    store: Arc<dyn BaseDocumentStore>,
    renderer: Arc<dyn MarkupRenderer>,
    identity: IdentityWatch,
    settings: AnalyzerSettings,
    state: Arc<Mutex<WidgetState>>,
    cancel: CancellationToken,
    background_writes: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl AnalyzerWidget {
    pub fn new(deps: &ServerDeps, identity: IdentityWatch) -> Self {
        let settings = deps.analyzer_settings.clone();
        Self {
            generator: deps.text_generator.clone(),
            store: deps.document_store.clone(),
            renderer: deps.markup_renderer.clone(),
            identity,
            state: Arc::new(Mutex::new(WidgetState {
                business_name: String::new(),
                location: settings.default_location.clone(),
                phase: Phase::Idle,
                error: None,
                result: None,
                copied_at: None,
            })),
            settings,
            cancel: CancellationToken::new(),
            background_writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn set_business_name(&self, value: impl Into<String>) {
        self.state.lock().await.business_name = value.into();
    }

    pub async fn set_location(&self, value: impl Into<String>) {
        self.state.lock().await.location = value.into();
    }

    /// Run one analysis with the current inputs.
    pub async fn submit(&self) -> SubmitOutcome {
        self.start(None).await
    }

    /// Replace both inputs and run one analysis. While a request is in flight
    /// this is a no-op and the inputs stay as they were.
    pub async fn submit_with(
        &self,
        business_name: impl Into<String>,
        location: impl Into<String>,
    ) -> SubmitOutcome {
        self.start(Some((business_name.into(), location.into()))).await
    }

    async fn start(&self, inputs: Option<(String, String)>) -> SubmitOutcome {
        let job = {
            let mut state = self.state.lock().await;

            if state.phase == Phase::Requesting {
                debug!("Submit ignored, analysis already in flight");
                return SubmitOutcome::Busy;
            }

            if let Some((business_name, location)) = inputs {
                state.business_name = business_name;
                state.location = location;
            }

            let request = match AnalysisRequest::new(&state.business_name, &state.location) {
                Ok(request) => request,
                Err(e) => return Self::reject(&mut state, e),
            };

            let Some(identity) = self.identity.current() else {
                warn!(identity = ?self.identity.state(), "Submit before identity established");
                return Self::reject(&mut state, ValidationError::IdentityNotReady);
            };

            state.phase = Phase::Requesting;
            state.result = None;
            state.error = None;
            state.copied_at = None;

            AnalysisJob {
                generator: self.generator.clone(),
                store: self.store.clone(),
                renderer: self.renderer.clone(),
                app_id: self.settings.app_id.clone(),
                state: self.state.clone(),
                cancel: self.cancel.clone(),
                background_writes: self.background_writes.clone(),
                request,
                identity,
            }
        };

        // The job settles the phase itself, so a caller that stops waiting
        // cannot leave the widget stuck in Requesting.
        match tokio::spawn(job.run()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Analysis task did not complete");
                let mut state = self.state.lock().await;
                state.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                state.phase = Phase::Failure;
                SubmitOutcome::Failed
            }
        }
    }

    fn reject(state: &mut WidgetState, error: ValidationError) -> SubmitOutcome {
        state.error = Some(error.to_string());
        state.phase = Phase::Idle;
        SubmitOutcome::Rejected(error)
    }

    /// Copy the displayed result's text. Returns whether the clipboard accepted it.
    pub async fn copy_result(&self, clipboard: &dyn BaseClipboard) -> bool {
        let text = {
            let state = self.state.lock().await;
            match (&state.result, state.phase) {
                (Some(result), phase) if phase != Phase::Requesting => result.plain_text.clone(),
                _ => return false,
            }
        };

        match clipboard.write_text(&text).await {
            Ok(()) => {
                self.state.lock().await.copied_at = Some(Instant::now());
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to copy text");
                false
            }
        }
    }

    pub async fn view(&self) -> WidgetView {
        let state = self.state.lock().await;
        let is_loading = state.phase == Phase::Requesting;

        WidgetView {
            business_name: state.business_name.clone(),
            location: state.location.clone(),
            phase: state.phase,
            is_loading,
            submit_enabled: !is_loading && !self.cancel.is_cancelled(),
            identity_ready: self.identity.current().is_some(),
            identity_failed: matches!(self.identity.state(), IdentityState::Failed(_)),
            error: state.error.clone(),
            result_markup: state.result.as_ref().map(|r| r.rendered_markup.clone()),
            copy_success: state.copy_success(),
        }
    }

    /// The currently displayed result, if any.
    pub async fn current_result(&self) -> Option<AnalysisResult> {
        self.state.lock().await.result.clone()
    }

    /// Abort any in-flight request or backoff wait. A result arriving after
    /// this point is discarded. Record writes already started still finish.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for every record write started so far.
    pub async fn drain_background_writes(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.background_writes.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Record write task did not complete");
            }
        }
    }
}

/// One in-flight analysis, detached from whoever asked for it.
struct AnalysisJob {
    generator: Arc<dyn BaseTextGenerator>,
    store: Arc<dyn BaseDocumentStore>,
    renderer: Arc<dyn MarkupRenderer>,
    app_id: String,
    state: Arc<Mutex<WidgetState>>,
    cancel: CancellationToken,
    background_writes: Arc<Mutex<Vec<JoinHandle<()>>>>,
    request: AnalysisRequest,
    identity: Identity,
}

impl AnalysisJob {
    async fn run(self) -> SubmitOutcome {
        info!(
            user_id = %self.identity.user_id,
            business_name = self.request.business_name(),
            location = self.request.location(),
            "Starting presence analysis"
        );

        let user_query = prompts::user_query(&self.request);
        let generated = self
            .generator
            .generate_grounded(prompts::SYSTEM_INSTRUCTION, &user_query, &self.cancel)
            .await;

        let mut state = self.state.lock().await;

        if self.cancel.is_cancelled() {
            debug!("Widget torn down during analysis, discarding outcome");
            state.phase = Phase::Idle;
            return SubmitOutcome::Cancelled;
        }

        match generated {
            Ok(raw_text) => {
                let result = AnalysisResult::render(raw_text, self.renderer.as_ref());
                state.result = Some(result.clone());
                state.phase = Phase::Success;

                let collection =
                    CollectionPath::presence_analysis(&self.app_id, &self.identity.user_id);
                let record = AnalysisRecord::new(&self.request, &result);
                let handle =
                    spawn_record_write(self.store.clone(), self.identity, collection, record);

                // Tracked before the state lock is released
                let mut writes = self.background_writes.lock().await;
                writes.retain(|h| !h.is_finished());
                writes.push(handle);

                SubmitOutcome::Completed(result)
            }
            Err(e) => {
                warn!(error = %e, "Presence analysis failed");
                state.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                state.phase = Phase::Failure;
                SubmitOutcome::Failed
            }
        }
    }
}
