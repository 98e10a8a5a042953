//! Test helpers for intake unit tests
//!
//! Provides a scripted in-memory [`ContentApi`](kbase_api_client::ContentApi)
//! so the workflow can be exercised without an HTTP server.

pub mod mock_api;

pub use mock_api::*;

use kbase_core::models::KnowledgeDatabase;

pub fn database(db_id: &str, display_name: &str) -> KnowledgeDatabase {
    KnowledgeDatabase {
        db_id: db_id.to_string(),
        display_name: display_name.to_string(),
    }
}
