//! Remote content already stored in one knowledge database.

use anyhow::{bail, Result};
use kbase_api_client::ContentApi;
use kbase_core::models::{ContentItem, ContentUpdate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::session::ContentChangeListener;

pub struct ContentLibrary {
    api: Arc<dyn ContentApi>,
    db_id: String,
    items: Vec<ContentItem>,
    stale: AtomicBool,
}

impl ContentLibrary {
    /// Starts empty and stale; call [`refresh`](Self::refresh) to load.
    pub fn new(api: Arc<dyn ContentApi>, db_id: impl Into<String>) -> Self {
        Self {
            api,
            db_id: db_id.into(),
            items: Vec::new(),
            stale: AtomicBool::new(true),
        }
    }

    pub fn db_id(&self) -> &str {
        &self.db_id
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn get(&self, content_id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.id == content_id)
    }

    /// Items the server is still processing.
    pub fn pending(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|i| i.is_processing())
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    pub async fn refresh(&mut self) -> Result<&[ContentItem]> {
        let items = self.api.list_content(&self.db_id).await?;
        tracing::debug!(db_id = %self.db_id, count = items.len(), "Content list refreshed");
        self.items = items;
        self.stale.store(false, Ordering::Release);
        Ok(&self.items)
    }

    /// Refresh only if a change was signalled since the last refresh.
    pub async fn refresh_if_stale(&mut self) -> Result<bool> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Remove locally first, then on the server. A failed request puts the
    /// item back where it was.
    pub async fn delete(&mut self, content_id: &str) -> Result<()> {
        let Some(index) = self.items.iter().position(|i| i.id == content_id) else {
            bail!("Content not found: {}", content_id);
        };
        let item = self.items.remove(index);

        if let Err(e) = self.api.delete_content(&self.db_id, content_id).await {
            tracing::warn!(
                db_id = %self.db_id,
                content_id = %content_id,
                error = %e,
                "Delete failed, restoring item"
            );
            self.items.insert(index.min(self.items.len()), item);
            return Err(e);
        }

        tracing::info!(db_id = %self.db_id, content_id = %content_id, "Content deleted");
        Ok(())
    }

    /// Apply `update` on the server and replace the local row with the result.
    pub async fn update(
        &mut self,
        content_id: &str,
        update: &ContentUpdate,
    ) -> Result<&ContentItem> {
        if update.is_empty() {
            bail!("Nothing to update for content {}", content_id);
        }

        let updated = self
            .api
            .update_content(&self.db_id, content_id, update)
            .await?;

        let index = match self.items.iter().position(|i| i.id == content_id) {
            Some(index) => {
                self.items[index] = updated;
                index
            }
            None => {
                self.items.push(updated);
                self.items.len() - 1
            }
        };
        Ok(&self.items[index])
    }
}

impl ContentChangeListener for ContentLibrary {
    fn content_changed(&self, db_id: &str) {
        if db_id == self.db_id {
            self.stale.store(true, Ordering::Release);
        }
    }
}
