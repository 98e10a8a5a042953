//! The seam between the intake workflow and the knowledge API.

use anyhow::Result;
use async_trait::async_trait;
use kbase_core::models::{ContentItem, ContentStatusResponse, ContentUpdate, KnowledgeDatabase};

use crate::{ApiClient, CreateContentRequest};

/// Remote operations the intake workflow and content library depend on.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<KnowledgeDatabase>>;

    /// Returns the server-assigned content id.
    async fn create_content(&self, db_id: &str, request: CreateContentRequest) -> Result<String>;

    async fn content_status(&self, db_id: &str, content_id: &str)
        -> Result<ContentStatusResponse>;

    async fn list_content(&self, db_id: &str) -> Result<Vec<ContentItem>>;

    async fn update_content(
        &self,
        db_id: &str,
        content_id: &str,
        update: &ContentUpdate,
    ) -> Result<ContentItem>;

    async fn delete_content(&self, db_id: &str, content_id: &str) -> Result<()>;
}

#[async_trait]
impl ContentApi for ApiClient {
    async fn list_databases(&self) -> Result<Vec<KnowledgeDatabase>> {
        ApiClient::list_databases(self).await
    }

    async fn create_content(&self, db_id: &str, request: CreateContentRequest) -> Result<String> {
        ApiClient::create_content(self, db_id, request).await
    }

    async fn content_status(
        &self,
        db_id: &str,
        content_id: &str,
    ) -> Result<ContentStatusResponse> {
        self.get_content_status(db_id, content_id).await
    }

    async fn list_content(&self, db_id: &str) -> Result<Vec<ContentItem>> {
        ApiClient::list_content(self, db_id).await
    }

    async fn update_content(
        &self,
        db_id: &str,
        content_id: &str,
        update: &ContentUpdate,
    ) -> Result<ContentItem> {
        ApiClient::update_content(self, db_id, content_id, update).await
    }

    async fn delete_content(&self, db_id: &str, content_id: &str) -> Result<()> {
        ApiClient::delete_content(self, db_id, content_id).await
    }
}
