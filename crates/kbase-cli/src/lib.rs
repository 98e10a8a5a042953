use chrono::{DateTime, Utc};
use kbase_core::models::MetadataPair;
use kbase_core::{ErrorMetadata, KbError};
use kbase_intake::SubmitError;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a `key=value` command-line argument.
pub fn parse_metadata_arg(raw: &str) -> Result<MetadataPair, String> {
    MetadataPair::parse_assignment(raw)
        .ok_or_else(|| format!("expected key=value with a non-empty key and value, got '{}'", raw))
}

/// Parse a `NAME=BODY` text argument. The name may be empty.
pub fn parse_text_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, body)) => Ok((name.trim().to_string(), body.to_string())),
        None => Err(format!("expected NAME=BODY, got '{}'", raw)),
    }
}

/// Local validation error as shown to the user: message, code and hint.
pub fn describe_error(err: &KbError) -> String {
    match err.suggested_action() {
        Some(hint) => format!("{} [{}]. {}", err, err.error_code(), hint),
        None => format!("{} [{}]", err, err.error_code()),
    }
}

/// Validation failures get their hint; creation failures keep the server text.
pub fn describe_submit_error(err: &SubmitError) -> String {
    match err {
        SubmitError::Validation(e) => describe_error(e),
        other => other.to_string(),
    }
}

pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
