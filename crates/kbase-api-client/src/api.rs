//! Domain methods for the knowledge API client.
//!
//! Every content endpoint is scoped to a knowledge database through the
//! `db_id` query parameter.

use crate::ApiClient;
use anyhow::{Context, Result};
use kbase_core::models::{
    ChunkingConfig, ConfigResponse, ContentItem, ContentListResponse, ContentStatusResponse,
    ContentUpdate, KnowledgeDatabase, ReaderKind,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What a new content item is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    /// Local file, read when the request is sent.
    File(PathBuf),
    Url(String),
    Text(String),
}

/// Everything the create endpoint needs for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContentRequest {
    pub name: String,
    pub description: Option<String>,
    pub payload: ContentPayload,
    pub reader: ReaderKind,
    pub chunking: ChunkingConfig,
    pub metadata: BTreeMap<String, String>,
}

impl CreateContentRequest {
    async fn into_form(self) -> Result<Form> {
        let mut form = Form::new()
            .text("name", self.name)
            .text("reader_id", self.reader.id().to_string())
            .text(
                "metadata",
                serde_json::to_string(&self.metadata).context("Failed to encode metadata")?,
            );

        if let Some(description) = self.description.filter(|d| !d.trim().is_empty()) {
            form = form.text("description", description);
        }

        if self.chunking.enabled {
            form = form
                .text("chunker", self.chunking.kind.id().to_string())
                .text("chunk_size", self.chunking.size.to_string())
                .text("chunk_overlap", self.chunking.overlap.to_string());
        }

        form = match self.payload {
            ContentPayload::Url(url) => form.text("url", url),
            ContentPayload::Text(text) => form.text("text_content", text),
            ContentPayload::File(path) => {
                let buffer = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read file: {}", path.display()))?;
                let filename = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("upload.bin")
                    .to_string();
                form.part("file", Part::bytes(buffer).file_name(filename))
            }
        };

        Ok(form)
    }
}

/// Extract the server-assigned id from a create response.
///
/// Priority order: top-level `id`, then top-level `content_id`, then `data.id`.
/// Strings count only when non-blank (they are trimmed); integers are rendered
/// in decimal. Anything else is skipped.
pub fn parse_created_id(body: &JsonValue) -> Option<String> {
    let candidates = [
        body.get("id"),
        body.get("content_id"),
        body.get("data").and_then(|data| data.get("id")),
    ];

    candidates.into_iter().flatten().find_map(|value| match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

fn db_query(db_id: &str) -> [(&'static str, String); 1] {
    [("db_id", db_id.to_string())]
}

fn content_path(content_id: &str) -> String {
    format!("/knowledge/content/{}", urlencoding::encode(content_id))
}

impl ApiClient {
    /// Fetch the server configuration.
    pub async fn get_config(&self) -> Result<ConfigResponse> {
        self.get("/config", &[]).await
    }

    /// Knowledge databases listed in the server configuration.
    pub async fn list_databases(&self) -> Result<Vec<KnowledgeDatabase>> {
        Ok(self.get_config().await?.knowledge_databases())
    }

    /// Create one content item and return its id.
    pub async fn create_content(
        &self,
        db_id: &str,
        request: CreateContentRequest,
    ) -> Result<String> {
        let name = request.name.clone();
        let form = request.into_form().await?;
        let body: JsonValue = self
            .post_multipart("/knowledge/content", &db_query(db_id), form)
            .await?;

        let id = parse_created_id(&body).with_context(|| {
            format!("Create response for '{}' did not contain a content id: {}", name, body)
        })?;

        tracing::debug!(db_id = %db_id, content_id = %id, name = %name, "Content created");
        Ok(id)
    }

    /// Current processing status of one content item.
    pub async fn get_content_status(
        &self,
        db_id: &str,
        content_id: &str,
    ) -> Result<ContentStatusResponse> {
        self.get(
            &format!("{}/status", content_path(content_id)),
            &db_query(db_id),
        )
        .await
    }

    /// Every content item in a database.
    pub async fn list_content(&self, db_id: &str) -> Result<Vec<ContentItem>> {
        let response: ContentListResponse =
            self.get("/knowledge/content", &db_query(db_id)).await?;
        Ok(response.into_items())
    }

    /// Get a single content item by id.
    pub async fn get_content(&self, db_id: &str, content_id: &str) -> Result<ContentItem> {
        self.get(&content_path(content_id), &db_query(db_id)).await
    }

    /// Edit name, description or metadata of an existing item.
    pub async fn update_content(
        &self,
        db_id: &str,
        content_id: &str,
        update: &ContentUpdate,
    ) -> Result<ContentItem> {
        self.patch_json(&content_path(content_id), &db_query(db_id), update)
            .await
    }

    /// Delete a content item by id.
    pub async fn delete_content(&self, db_id: &str, content_id: &str) -> Result<()> {
        self.delete(&content_path(content_id), &db_query(db_id))
            .await
    }
}
