//! The content intake session.
//!
//! [`IntakeSession`] owns everything the "add content" workflow needs while it
//! is open: the database selection, the draft list, the URL and text forms and
//! the submission state. Closing the session resets it and cancels any status
//! polling still in flight.
//!
//! Submission creates the selected drafts one at a time. The first failure
//! aborts the batch. Once every draft is created, each new item is polled
//! concurrently until it leaves `processing` or the attempt budget runs out.
//! Then the change listener is notified exactly once and the session closes.

use futures::future::join_all;
use kbase_api_client::{ContentApi, ContentPayload, CreateContentRequest};
use kbase_core::models::{flatten_metadata, KnowledgeDatabase};
use kbase_core::{ErrorMetadata, KbError, LogLevel};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::catalog::DatabaseCatalog;
use crate::draft::{DraftId, DraftItem, DraftList, DraftSource};
use crate::forms::{TextForm, UrlForm};
use crate::poller::{spawn_poll, PollOutcome, PollPolicy};

/// Told when a submission has added content to a database.
pub trait ContentChangeListener: Send + Sync {
    fn content_changed(&self, db_id: &str);
}

impl<F> ContentChangeListener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn content_changed(&self, db_id: &str) {
        self(db_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    /// Human-readable message; the session stays open for another attempt.
    Failed(String),
}

/// A draft the server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContent {
    pub draft_id: DraftId,
    pub name: String,
    pub content_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedItem {
    pub draft_id: DraftId,
    pub name: String,
    pub content_id: String,
    pub outcome: PollOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub db_id: String,
    pub items: Vec<SubmittedItem>,
}

impl SubmissionReport {
    pub fn exhausted(&self) -> impl Iterator<Item = &SubmittedItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, PollOutcome::Exhausted { .. }))
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] KbError),

    /// A create request failed. Items in `created` were already accepted by
    /// the server; their drafts are still in the list.
    #[error("Failed to add '{name}': {message}")]
    Create {
        name: String,
        message: String,
        created: Vec<CreatedContent>,
        #[source]
        source: anyhow::Error,
    },
}

impl SubmitError {
    pub fn log_level(&self) -> LogLevel {
        match self {
            SubmitError::Validation(e) => e.log_level(),
            SubmitError::Create { .. } => LogLevel::Error,
        }
    }
}

pub struct IntakeSession {
    api: Arc<dyn ContentApi>,
    policy: PollPolicy,
    catalog: DatabaseCatalog,
    db_id: Option<String>,
    default_db_id: Option<String>,
    drafts: DraftList,
    pub url_form: UrlForm,
    pub text_form: TextForm,
    state: SubmissionState,
    open: bool,
    cancel: CancellationToken,
}

impl IntakeSession {
    pub fn new(api: Arc<dyn ContentApi>, policy: PollPolicy) -> Self {
        Self {
            api,
            policy,
            catalog: DatabaseCatalog::default(),
            db_id: None,
            default_db_id: None,
            drafts: DraftList::new(),
            url_form: UrlForm::default(),
            text_form: TextForm::default(),
            state: SubmissionState::Idle,
            open: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Database to select when the catalog loads, if the server lists it.
    pub fn with_default_database(mut self, db_id: Option<String>) -> Self {
        self.default_db_id = db_id;
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn catalog(&self) -> &DatabaseCatalog {
        &self.catalog
    }

    pub fn database_id(&self) -> Option<&str> {
        self.db_id.as_deref()
    }

    pub fn drafts(&self) -> &DraftList {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut DraftList {
        &mut self.drafts
    }

    /// Token that outstanding polls are children of. Cancelling it has the
    /// same effect on polling as closing the session.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Add a draft from the URL form. See [`UrlForm::submit`].
    pub fn submit_url(&mut self) -> Result<DraftId, KbError> {
        self.url_form.submit(&mut self.drafts)
    }

    /// Add a draft from the text form. See [`TextForm::submit`].
    pub fn submit_text(&mut self) -> Result<DraftId, KbError> {
        self.text_form.submit(&mut self.drafts)
    }

    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.reset();
        self.open = true;
        tracing::debug!("Intake session opened");
    }

    /// Cancel outstanding polls and discard drafts and form input. The
    /// database selection survives.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.reset();
        self.open = false;
        tracing::debug!("Intake session closed");
    }

    fn reset(&mut self) {
        self.drafts.clear();
        self.url_form.reset();
        self.text_form.reset();
        self.state = SubmissionState::Idle;
    }

    /// Fetch the database list. Keeps the current selection if it is still
    /// listed, otherwise falls back to the configured default and then to the
    /// only database when there is exactly one.
    pub async fn load_databases(&mut self) -> anyhow::Result<&[KnowledgeDatabase]> {
        let databases = self.api.list_databases().await?;
        self.catalog = DatabaseCatalog::new(databases);
        if self.catalog.is_empty() {
            tracing::warn!("Server lists no knowledge databases");
        }

        let keep = self
            .db_id
            .as_deref()
            .is_some_and(|id| self.catalog.get(id).is_some());
        if !keep {
            self.db_id = self
                .default_db_id
                .as_deref()
                .and_then(|id| self.catalog.get(id))
                .or_else(|| self.catalog.single())
                .map(|db| db.db_id.clone());
        }

        tracing::debug!(
            databases = self.catalog.databases().len(),
            selected = ?self.db_id,
            "Knowledge databases loaded"
        );
        Ok(self.catalog.databases())
    }

    pub fn select_database(&mut self, db_id: &str) -> Result<(), KbError> {
        if self.catalog.get(db_id).is_none() {
            return Err(KbError::UnknownDatabase(db_id.to_string()));
        }
        self.db_id = Some(db_id.to_string());
        Ok(())
    }

    /// Submit every selected draft.
    ///
    /// Returns `Ok(None)` when nothing is selected. Validation of all selected
    /// drafts happens before the first request. The draft list is left as it
    /// was until the whole batch is created. If the session is cancelled
    /// while polling, the report is still returned but the listener is not
    /// notified.
    pub async fn submit(
        &mut self,
        listener: &dyn ContentChangeListener,
    ) -> Result<Option<SubmissionReport>, SubmitError> {
        let selected: Vec<DraftItem> = self.drafts.selected().cloned().collect();
        if selected.is_empty() {
            tracing::debug!("Nothing selected, submission skipped");
            return Ok(None);
        }

        let db_id = match self.db_id.clone() {
            Some(id) => id,
            None => return Err(self.fail(KbError::NoDatabaseSelected.into())),
        };

        let requests = match selected
            .iter()
            .map(build_request)
            .collect::<Result<Vec<_>, KbError>>()
        {
            Ok(requests) => requests,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.state = SubmissionState::Submitting;
        tracing::info!(db_id = %db_id, count = requests.len(), "Submitting content");

        let mut created = Vec::with_capacity(requests.len());
        for (draft, request) in selected.iter().zip(requests) {
            match self.api.create_content(&db_id, request).await {
                Ok(content_id) => {
                    created.push(CreatedContent {
                        draft_id: draft.id,
                        name: draft.name.clone(),
                        content_id,
                    });
                }
                Err(source) => {
                    return Err(self.fail(SubmitError::Create {
                        name: draft.name.clone(),
                        message: format!("{:#}", source),
                        created,
                        source,
                    }));
                }
            }
        }

        let handles = created
            .iter()
            .map(|item| {
                spawn_poll(
                    self.api.clone(),
                    db_id.clone(),
                    item.content_id.clone(),
                    self.policy,
                    self.cancel.child_token(),
                )
            })
            .collect::<Vec<_>>();

        let outcomes = join_all(handles).await;
        let items = created
            .into_iter()
            .zip(outcomes)
            .map(|(item, joined)| {
                let outcome = joined.unwrap_or_else(|e| {
                    tracing::error!(content_id = %item.content_id, error = %e, "Poll task failed");
                    PollOutcome::Cancelled
                });
                SubmittedItem {
                    draft_id: item.draft_id,
                    name: item.name,
                    content_id: item.content_id,
                    outcome,
                }
            })
            .collect();
        let report = SubmissionReport { db_id, items };

        if self.cancel.is_cancelled() {
            tracing::info!(db_id = %report.db_id, "Submission cancelled while polling");
            self.close();
            return Ok(Some(report));
        }

        tracing::info!(
            db_id = %report.db_id,
            items = report.items.len(),
            exhausted = report.exhausted().count(),
            "Submission complete"
        );
        listener.content_changed(&report.db_id);
        self.close();
        self.state = SubmissionState::Succeeded;
        Ok(Some(report))
    }

    fn fail(&mut self, error: SubmitError) -> SubmitError {
        match error.log_level() {
            LogLevel::Error => tracing::error!(error = %error, "Submission failed"),
            LogLevel::Warn => tracing::warn!(error = %error, "Submission failed"),
            LogLevel::Debug => tracing::debug!(error = %error, "Submission rejected"),
        }
        self.state = SubmissionState::Failed(error.to_string());
        error
    }
}

impl Drop for IntakeSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn build_request(draft: &DraftItem) -> Result<CreateContentRequest, KbError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(KbError::EmptyName(draft.id.to_string()));
    }

    let payload = match &draft.source {
        DraftSource::File(path) => ContentPayload::File(path.clone()),
        DraftSource::Url(url) => ContentPayload::Url(url.clone()),
        DraftSource::Text(text) if text.trim().is_empty() => return Err(KbError::EmptyText),
        DraftSource::Text(text) => ContentPayload::Text(text.clone()),
    };

    draft.chunking.validate()?;
    let metadata = flatten_metadata(&draft.metadata);

    let description = Some(draft.description.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(CreateContentRequest {
        name: name.to_string(),
        description,
        payload,
        reader: draft.reader,
        chunking: draft.chunking,
        metadata,
    })
}
