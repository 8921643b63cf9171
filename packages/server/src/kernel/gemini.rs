use anyhow::Result;
use async_trait::async_trait;
use gemini_client::{GeminiClient, HttpTransport, Transport};
use tokio_util::sync::CancellationToken;

use super::BaseTextGenerator;

/// Search-grounded text generation backed by the Gemini API.
///
/// Retry and backoff live in the client; by the time an error surfaces here
/// every attempt has been spent.
pub struct GeminiTextGenerator<T: Transport = HttpTransport> {
    client: GeminiClient<T>,
}

impl<T: Transport> GeminiTextGenerator<T> {
    pub fn new(client: GeminiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GeminiClient<T> {
        &self.client
    }
}

#[async_trait]
impl<T: Transport + 'static> BaseTextGenerator for GeminiTextGenerator<T> {
    async fn generate_grounded(
        &self,
        system_instruction: &str,
        user_query: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let text = self
            .client
            .generate_with_search(system_instruction, user_query, cancel)
            .await?;
        Ok(text)
    }
}
