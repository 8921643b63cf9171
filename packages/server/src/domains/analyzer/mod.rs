//! Online Presence Analyzer.
//!
//! Takes a business name and location, asks a search-grounded model for
//! local-SEO advice, renders the answer as HTML, and appends a record of it
//! to the visitor's collection.

pub mod markdown;
pub mod models;
pub mod persistence;
pub mod prompts;
pub mod widget;

pub use markdown::{CommonMark, MarkdownLite, MarkupRenderer, RendererKind};
pub use models::{
    AnalysisRecord, AnalysisRequest, AnalysisResult, CollectionPath, StoredRecord,
    ValidationError,
};
pub use widget::{
    AnalyzerSettings, AnalyzerWidget, Phase, SubmitOutcome, WidgetView,
    ANALYSIS_FAILED_MESSAGE, COPY_CONFIRMATION_DURATION,
};
