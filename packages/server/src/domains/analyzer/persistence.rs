//! Background persistence of analysis records.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::models::{AnalysisRecord, CollectionPath};
use crate::domains::identity::Identity;
use crate::kernel::BaseDocumentStore;

/// Append a record on a background task.
///
/// The caller does not await the handle to make progress; the outcome is
/// logged here and never reaches the user.
pub fn spawn_record_write(
    store: Arc<dyn BaseDocumentStore>,
    identity: Identity,
    collection: CollectionPath,
    record: AnalysisRecord,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.append(&identity, &collection, &record).await {
            Ok(document_id) => info!(
                user_id = %identity.user_id,
                collection = %collection,
                document_id = %document_id,
                "Analysis saved"
            ),
            Err(e) => error!(
                user_id = %identity.user_id,
                collection = %collection,
                error = %e,
                "Failed to save analysis"
            ),
        }
    })
}
