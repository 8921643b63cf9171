use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use super::BaseDocumentStore;
use crate::domains::analyzer::models::{AnalysisRecord, CollectionPath};
use crate::domains::identity::Identity;

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Append-only writes to Cloud Firestore through its REST `commit` endpoint.
///
/// Each append is a single create-only write whose `createdAt` field is set
/// by the server to the commit time.
pub struct FirestoreDocumentStore {
    project_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl FirestoreDocumentStore {
    pub fn new(project_id: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            project_id,
            base_url: FIRESTORE_BASE_URL.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn database(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }

    fn commit_body(
        &self,
        collection: &CollectionPath,
        document_id: &str,
        record: &AnalysisRecord,
    ) -> Value {
        let name = format!(
            "{}/documents/{}/{}",
            self.database(),
            collection,
            document_id
        );

        json!({
            "writes": [{
                "update": {
                    "name": name,
                    "fields": {
                        "businessName": { "stringValue": record.business_name },
                        "location": { "stringValue": record.location },
                        "result": { "stringValue": record.result },
                    }
                },
                "updateTransforms": [{
                    "fieldPath": "createdAt",
                    "setToServerValue": "REQUEST_TIME"
                }],
                "currentDocument": { "exists": false }
            }]
        })
    }
}

#[async_trait]
impl BaseDocumentStore for FirestoreDocumentStore {
    async fn append(
        &self,
        identity: &Identity,
        collection: &CollectionPath,
        record: &AnalysisRecord,
    ) -> Result<String> {
        let document_id = Uuid::new_v4().simple().to_string();
        let body = self.commit_body(collection, &document_id, record);

        let mut request = self
            .client
            .post(format!("{}/{}/documents:commit", self.base_url, self.database()))
            .json(&body);
        if let Some(token) = &identity.id_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send Firestore commit request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Firestore error {}: {}", status, body);
        }

        Ok(document_id)
    }
}
