//! Gemini `generateContent` client
//!
//! A small client for Google's Generative Language API, focused on one job:
//! send a system instruction and a user query with Google Search grounding
//! enabled, and return the first candidate's text. Transient failures are
//! retried with exponential backoff; the whole call can be cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//! use tokio_util::sync::CancellationToken;
//!
//! let client = GeminiClient::from_env()?;
//! let cancel = CancellationToken::new();
//!
//! let tips = client
//!     .generate_with_search(
//!         "You are a local SEO analyzer",
//!         "Analyze the online presence for \"Shukla Chaat House\" in \"Lucknow\"",
//!         &cancel,
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod retry;
pub mod transport;
pub mod types;

pub use error::{GeminiError, Result};
pub use retry::RetryPolicy;
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpTransport, RawResponse, Transport, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::*;

use tracing::{debug, error, warn};

/// Gemini API client, generic over its transport for testability.
#[derive(Debug, Clone)]
pub struct GeminiClient<T = HttpTransport> {
    transport: T,
    retry_policy: RetryPolicy,
}

impl GeminiClient<HttpTransport> {
    /// Create a client for the public endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_transport(HttpTransport::new(api_key))
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.transport = self.transport.with_base_url(url);
        self
    }

    /// Set the model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.transport = self.transport.with_model(model);
        self
    }

    pub fn model(&self) -> &str {
        self.transport.model()
    }
}

impl<T: Transport> GeminiClient<T> {
    /// Create a client over an arbitrary transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Search-grounded generation.
    ///
    /// Builds the request (user query as content, system instruction on its own
    /// channel, `google_search` tool enabled) and runs it through
    /// [`generate_content`](Self::generate_content).
    pub async fn generate_with_search(
        &self,
        system_instruction: &str,
        user_query: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = GenerateContentRequest::new(user_query)
            .system_instruction(system_instruction)
            .with_google_search();

        self.generate_content(&request, cancel).await
    }

    /// Send a request with bounded retry and return the first candidate's text.
    ///
    /// - 2xx with text: returned.
    /// - 2xx without text, 429, 5xx, network failure: retried after a backoff
    ///   delay, up to the policy's attempt limit, then `Exhausted`.
    /// - Any other status: `Api` error after a single attempt.
    /// - Cancellation at any point: `Cancelled`.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut last_error = GeminiError::MissingText;

        for attempt in 1..=max_attempts {
            let start = tokio::time::Instant::now();

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GeminiError::Cancelled),
                outcome = self.transport.send(request) => outcome,
            };

            match classify(outcome) {
                Ok(text) => {
                    debug!(
                        attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Gemini generateContent succeeded"
                    );
                    return Ok(text);
                }
                Err(e) if !e.is_retryable() => {
                    error!(attempt, error = %e, "Gemini request failed, not retrying");
                    return Err(e);
                }
                Err(e) => {
                    if attempt == max_attempts {
                        warn!(attempt, error = %e, "Gemini request failed on final attempt");
                        last_error = e;
                        break;
                    }

                    let delay = self.retry_policy.delay_after(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Gemini request failed, retrying"
                    );
                    last_error = e;

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(GeminiError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        Err(GeminiError::Exhausted {
            attempts: max_attempts,
            last: Box::new(last_error),
        })
    }
}

/// Map one transport outcome onto answer text or a classified error.
fn classify(outcome: Result<RawResponse>) -> Result<String> {
    let raw = outcome?;

    if raw.is_success() {
        let response: GenerateContentResponse = serde_json::from_str(&raw.body)
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        return match response.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                warn!(body = %raw.body, "Gemini response missing text");
                Err(GeminiError::MissingText)
            }
        };
    }

    let message = ApiErrorBody::message_from(&raw.body);
    if RetryPolicy::is_retryable_status(raw.status) {
        Err(GeminiError::Upstream {
            status: raw.status,
            message,
        })
    } else {
        Err(GeminiError::Api {
            status: raw.status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    fn ok_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    /// Transport that replays a fixed script and records every request.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        script: Arc<Mutex<Vec<Result<RawResponse>>>>,
        calls: Arc<Mutex<Vec<(Instant, GenerateContentRequest)>>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<RawResponse>>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn repeat(response: RawResponse, times: usize) -> Self {
            Self::new((0..times).map(|_| Ok(response.clone())).collect())
        }

        fn attempts(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &GenerateContentRequest) -> Result<RawResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), request.clone()));

            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                panic!("transport called more times than scripted");
            }
            script.remove(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_four_times_then_success() {
        let mut script: Vec<Result<RawResponse>> = (0..4)
            .map(|_| Ok(RawResponse::new(429, r#"{"error":{"message":"Resource exhausted"}}"#)))
            .collect();
        script.push(Ok(RawResponse::new(200, ok_body("* Claim your GMB listing"))));
        let transport = ScriptedTransport::new(script);
        let client = GeminiClient::with_transport(transport.clone());

        let start = Instant::now();
        let text = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "* Claim your GMB listing");
        assert_eq!(transport.attempts(), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(1 + 2 + 4 + 8));

        let times = transport.call_times();
        let gaps: Vec<u64> = times.windows(2).map(|w| (w[1] - w[0]).as_secs()).collect();
        assert_eq!(gaps, vec![1, 2, 4, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_exhausts_after_five_attempts() {
        let transport = ScriptedTransport::repeat(RawResponse::new(500, "Internal error"), 5);
        let client = GeminiClient::with_transport(transport.clone());

        let err = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(transport.attempts(), 5);
        match err {
            GeminiError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, GeminiError::Upstream { status: 500, .. }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_final_attempt() {
        let transport = ScriptedTransport::repeat(RawResponse::new(503, ""), 5);
        let client = GeminiClient::with_transport(transport);

        let start = Instant::now();
        let _ = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await;

        assert_eq!(start.elapsed(), Duration::from_secs(1 + 2 + 4 + 8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_fails_without_retry() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(
            400,
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#,
        ))]);
        let client = GeminiClient::with_transport(transport.clone());

        let start = Instant::now();
        let err = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(transport.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_text_is_retried() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawResponse::new(200, r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)),
            Ok(RawResponse::new(200, "not json")),
            Ok(RawResponse::new(200, ok_body("tips"))),
        ]);
        let client = GeminiClient::with_transport(transport.clone());

        let text = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "tips");
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_on_every_attempt() {
        let script = (0..5)
            .map(|_| Err(GeminiError::Network("connection refused".into())))
            .collect();
        let transport = ScriptedTransport::new(script);
        let client = GeminiClient::with_transport(transport.clone());

        let err = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(transport.attempts(), 5);
        match err {
            GeminiError::Exhausted { last, .. } => {
                assert!(matches!(*last, GeminiError::Network(_)))
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_then_success() {
        let transport = ScriptedTransport::new(vec![
            Err(GeminiError::Network("reset".into())),
            Ok(RawResponse::new(200, ok_body("recovered"))),
        ]);
        let client = GeminiClient::with_transport(transport.clone());

        let text = client
            .generate_with_search("system", "query", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "recovered");
        assert_eq!(transport.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_backoff() {
        let transport = ScriptedTransport::repeat(RawResponse::new(429, ""), 5);
        let client = GeminiClient::with_transport(transport.clone());
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let err = client
            .generate_with_search("system", "query", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::Cancelled));
        // First attempt, 1s wait, second attempt, cancelled during the 2s wait
        assert_eq!(transport.attempts(), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_makes_no_request() {
        let transport = ScriptedTransport::new(vec![]);
        let client = GeminiClient::with_transport(transport.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .generate_with_search("system", "query", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::Cancelled));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_carries_grounding_and_instruction() {
        let transport =
            ScriptedTransport::new(vec![Ok(RawResponse::new(200, ok_body("ok")))]);
        let client = GeminiClient::with_transport(transport.clone());

        client
            .generate_with_search("persona", "question", &CancellationToken::new())
            .await
            .unwrap();

        let calls = transport.calls.lock().unwrap();
        let request = &calls[0].1;
        assert_eq!(request.contents, vec![Content::text("question")]);
        assert_eq!(request.system_instruction, Some(Content::text("persona")));
        assert_eq!(request.tools, vec![Tool::google_search()]);
    }

    #[test]
    fn test_client_builder() {
        let client = GeminiClient::new("test-key")
            .with_model("gemini-test")
            .with_retry_policy(RetryPolicy::new().with_max_attempts(3));

        assert_eq!(client.model(), "gemini-test");
        assert_eq!(client.retry_policy().max_attempts, 3);
    }
}
