use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::BaseClipboard;

/// Holds copied text for the caller to deliver.
///
/// The server has no clipboard of its own; the copy route hands the captured
/// text to the browser, which performs the actual write.
#[derive(Debug, Default)]
pub struct CapturedClipboard {
    text: Mutex<Option<String>>,
}

impl CapturedClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_text(self) -> Option<String> {
        self.text.into_inner()
    }
}

#[async_trait]
impl BaseClipboard for CapturedClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        *self.text.lock().await = Some(text.to_string());
        Ok(())
    }
}
