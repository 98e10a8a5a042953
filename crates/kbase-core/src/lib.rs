//! kbase Core Library
//!
//! Domain models, error types and configuration shared by the
//! API client, the intake workflow and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ErrorMetadata, KbError, LogLevel};
