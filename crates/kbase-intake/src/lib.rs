//! Content intake workflow for the knowledge API.
//!
//! Users collect drafts (local files, URLs, pasted text), tune each draft's
//! reader, chunking and metadata, then submit the selected ones to a knowledge
//! database. Creation is sequential; status polling of the created items runs
//! concurrently. [`ContentLibrary`] covers what is already stored.

pub mod catalog;
pub mod draft;
pub mod forms;
pub mod library;
pub mod poller;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::DatabaseCatalog;
pub use draft::{DraftId, DraftItem, DraftList, DraftPatch, DraftSource, MetadataInput};
pub use forms::{TextForm, UrlForm};
pub use library::ContentLibrary;
pub use poller::{poll_until_settled, spawn_poll, PollOutcome, PollPolicy};
pub use session::{
    ContentChangeListener, CreatedContent, IntakeSession, SubmissionReport, SubmissionState,
    SubmitError, SubmittedItem,
};
