//! Mock content API for testing
//!
//! Create results and per-item status sequences are scripted up front. Every
//! call is appended to a log so tests can assert on ordering and counts.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use kbase_api_client::{ContentApi, CreateContentRequest};
use kbase_core::models::{
    ContentItem, ContentStatus, ContentStatusResponse, ContentUpdate, KnowledgeDatabase,
};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListDatabases,
    Create { db_id: String, name: String },
    Status { content_id: String },
    List { db_id: String },
    Update { content_id: String },
    Delete { content_id: String },
}

/// Scripted in-memory API.
///
/// Creates without a scripted result succeed with ids `c1`, `c2`, ... Status
/// checks without a remaining script entry report `processing`.
#[derive(Default)]
pub struct MockContentApi {
    databases: Mutex<Vec<KnowledgeDatabase>>,
    create_results: Mutex<VecDeque<Result<String, String>>>,
    created: Mutex<Vec<CreateContentRequest>>,
    status_scripts: Mutex<HashMap<String, VecDeque<Result<ContentStatus, String>>>>,
    items: Mutex<Vec<ContentItem>>,
    failing_ids: Mutex<HashSet<String>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_databases(self, databases: Vec<KnowledgeDatabase>) -> Self {
        *self.databases.lock().unwrap() = databases;
        self
    }

    pub fn with_create_results(self, results: Vec<Result<&str, &str>>) -> Self {
        *self.create_results.lock().unwrap() = results
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        self
    }

    pub fn with_status_script(
        self,
        content_id: &str,
        script: Vec<Result<ContentStatus, String>>,
    ) -> Self {
        self.status_scripts
            .lock()
            .unwrap()
            .insert(content_id.to_string(), script.into());
        self
    }

    pub fn with_items(self, items: Vec<ContentItem>) -> Self {
        *self.items.lock().unwrap() = items;
        self
    }

    /// Update and delete calls for `content_id` fail.
    pub fn failing_for(self, content_id: &str) -> Self {
        self.failing_ids
            .lock()
            .unwrap()
            .insert(content_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<CreateContentRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Create { .. }))
            .count()
    }

    pub fn status_calls(&self, content_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Status { content_id: id } if id == content_id))
            .count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failing(&self, content_id: &str) -> Result<()> {
        if self.failing_ids.lock().unwrap().contains(content_id) {
            return Err(anyhow!(
                "API request failed with status 500 Internal Server Error: boom"
            ));
        }
        Ok(())
    }
}

pub fn content_item(id: &str, name: &str, status: ContentStatus) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        content_type: None,
        metadata: None,
        status: Some(status),
        status_message: None,
        updated_at: None,
    }
}

#[async_trait]
impl ContentApi for MockContentApi {
    async fn list_databases(&self) -> Result<Vec<KnowledgeDatabase>> {
        self.record(ApiCall::ListDatabases);
        Ok(self.databases.lock().unwrap().clone())
    }

    async fn create_content(&self, db_id: &str, request: CreateContentRequest) -> Result<String> {
        self.record(ApiCall::Create {
            db_id: db_id.to_string(),
            name: request.name.clone(),
        });
        let scripted = self.create_results.lock().unwrap().pop_front();
        match scripted {
            Some(Err(message)) => Err(anyhow!(message)),
            Some(Ok(id)) => {
                self.created.lock().unwrap().push(request);
                Ok(id)
            }
            None => {
                let mut created = self.created.lock().unwrap();
                created.push(request);
                Ok(format!("c{}", created.len()))
            }
        }
    }

    async fn content_status(
        &self,
        _db_id: &str,
        content_id: &str,
    ) -> Result<ContentStatusResponse> {
        self.record(ApiCall::Status {
            content_id: content_id.to_string(),
        });
        let next = self
            .status_scripts
            .lock()
            .unwrap()
            .get_mut(content_id)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Err(message)) => Err(anyhow!(message)),
            Some(Ok(status)) => Ok(ContentStatusResponse {
                status,
                status_message: None,
            }),
            None => Ok(ContentStatusResponse {
                status: ContentStatus::Processing,
                status_message: None,
            }),
        }
    }

    async fn list_content(&self, db_id: &str) -> Result<Vec<ContentItem>> {
        self.record(ApiCall::List {
            db_id: db_id.to_string(),
        });
        Ok(self.items.lock().unwrap().clone())
    }

    async fn update_content(
        &self,
        _db_id: &str,
        content_id: &str,
        update: &ContentUpdate,
    ) -> Result<ContentItem> {
        self.record(ApiCall::Update {
            content_id: content_id.to_string(),
        });
        self.check_failing(content_id)?;

        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == content_id)
            .ok_or_else(|| anyhow!("API request failed with status 404 Not Found: missing"))?;
        if let Some(name) = &update.name {
            item.name = name.clone();
        }
        if let Some(description) = &update.description {
            item.description = Some(description.clone());
        }
        if let Some(metadata) = &update.metadata {
            item.metadata = Some(
                metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
                    .collect(),
            );
        }
        Ok(item.clone())
    }

    async fn delete_content(&self, _db_id: &str, content_id: &str) -> Result<()> {
        self.record(ApiCall::Delete {
            content_id: content_id.to_string(),
        });
        self.check_failing(content_id)?;
        self.items.lock().unwrap().retain(|i| i.id != content_id);
        Ok(())
    }
}
