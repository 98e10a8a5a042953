//! Data models for the knowledge client
//!
//! Remote shapes returned by the knowledge API plus the enumerations the
//! intake workflow lets the user pick from.

mod chunking;
mod content;
mod database;
mod metadata;
mod reader;

// Re-export all models for convenient imports
pub use chunking::*;
pub use content::*;
pub use database::*;
pub use metadata::*;
pub use reader::*;
