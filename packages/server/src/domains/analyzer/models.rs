use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use thiserror::Error;

use super::markdown::MarkupRenderer;
use crate::domains::identity::UserId;

// =============================================================================
// Validation
// =============================================================================

/// Reasons a submit is refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a business name and location.")]
    MissingFields,

    #[error("Authentication error. Please refresh the page.")]
    IdentityNotReady,
}

// =============================================================================
// AnalysisRequest
// =============================================================================

/// A validated business/location pair. Both fields are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    business_name: String,
    location: String,
}

impl AnalysisRequest {
    pub fn new(business_name: &str, location: &str) -> Result<Self, ValidationError> {
        let business_name = business_name.trim();
        let location = location.trim();

        if business_name.is_empty() || location.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        Ok(Self {
            business_name: business_name.to_string(),
            location: location.to_string(),
        })
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

// =============================================================================
// AnalysisResult
// =============================================================================

/// One successful analysis as displayed. Immutable; replaced by the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub raw_text: String,
    pub rendered_markup: String,
    pub plain_text: String,
}

impl AnalysisResult {
    pub fn render(raw_text: String, renderer: &dyn MarkupRenderer) -> Self {
        Self {
            rendered_markup: renderer.render(&raw_text),
            plain_text: renderer.plain_text(&raw_text),
            raw_text,
        }
    }
}

// =============================================================================
// AnalysisRecord (persisted)
// =============================================================================

/// The persisted form of a successful analysis. `createdAt` is assigned by
/// the store at write time and is not part of the value written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub business_name: String,
    pub location: String,
    /// Raw generated text, before markup rendering
    pub result: String,
}

impl AnalysisRecord {
    pub fn new(request: &AnalysisRequest, result: &AnalysisResult) -> Self {
        Self {
            business_name: request.business_name().to_string(),
            location: request.location().to_string(),
            result: result.raw_text.clone(),
        }
    }
}

/// A record as read back from a store, with its server-assigned timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub record: AnalysisRecord,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CollectionPath
// =============================================================================

/// Slash-separated collection path inside the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Name of the per-user collection holding analyzer records.
    pub const PRESENCE_ANALYSIS: &'static str = "presence_analysis";

    /// `artifacts/{app_id}/users/{user_id}/presence_analysis`
    pub fn presence_analysis(app_id: &str, user_id: &UserId) -> Self {
        Self(format!(
            "artifacts/{}/users/{}/{}",
            app_id,
            user_id,
            Self::PRESENCE_ANALYSIS
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
