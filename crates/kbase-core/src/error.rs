//! Error types module
//!
//! `KbError` covers everything the client can reject locally, before any
//! request reaches the knowledge API: missing database selection, malformed
//! URLs, empty required fields, chunking violations and bad configuration. Remote failures stay `anyhow::Error` in the API client.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NO_DATABASE_SELECTED")
    fn error_code(&self) -> &'static str;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KbError {
    #[error("No database selected")]
    NoDatabaseSelected,

    #[error("Unknown database: {0}")]
    UnknownDatabase(String),

    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Name is required (draft {0})")]
    EmptyName(String),

    #[error("Text content is required")]
    EmptyText,

    #[error("Invalid chunking settings: {0}")]
    InvalidChunking(String),

    #[error("Unknown reader: {0}")]
    UnknownReader(String),

    #[error("Unknown chunker: {0}")]
    UnknownChunker(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Static metadata for each variant: (error_code, suggested_action, log_level).
fn kb_error_static_metadata(err: &KbError) -> (&'static str, Option<&'static str>, LogLevel) {
    match err {
        KbError::NoDatabaseSelected => (
            "NO_DATABASE_SELECTED",
            Some("Select a knowledge database first"),
            LogLevel::Debug,
        ),
        KbError::UnknownDatabase(_) => (
            "UNKNOWN_DATABASE",
            Some("Reload the configuration and pick a listed database"),
            LogLevel::Debug,
        ),
        KbError::InvalidUrl { .. } => (
            "INVALID_URL",
            Some("Enter an absolute URL such as https://example.com/page"),
            LogLevel::Debug,
        ),
        KbError::EmptyName(_) => (
            "EMPTY_NAME",
            Some("Give every selected item a name"),
            LogLevel::Debug,
        ),
        KbError::EmptyText => (
            "EMPTY_TEXT",
            Some("Paste some text before adding it"),
            LogLevel::Debug,
        ),
        KbError::InvalidChunking(_) => (
            "INVALID_CHUNKING",
            Some("Use a positive chunk size and an overlap smaller than it"),
            LogLevel::Debug,
        ),
        KbError::UnknownReader(_) => (
            "UNKNOWN_READER",
            Some("Pick one of the listed readers"),
            LogLevel::Debug,
        ),
        KbError::UnknownChunker(_) => (
            "UNKNOWN_CHUNKER",
            Some("Pick one of the listed chunkers"),
            LogLevel::Debug,
        ),
        KbError::InvalidConfig(_) => (
            "INVALID_CONFIG",
            Some("Fix the KBASE_* environment variables"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for KbError {
    fn error_code(&self) -> &'static str {
        kb_error_static_metadata(self).0
    }

    fn suggested_action(&self) -> Option<&'static str> {
        kb_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        kb_error_static_metadata(self).2
    }
}
