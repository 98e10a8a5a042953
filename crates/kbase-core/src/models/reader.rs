use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;
use url::Url;

use crate::error::KbError;

/// Ingestion strategy the server uses to turn raw content into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    Pdf,
    Csv,
    Docx,
    Text,
    Json,
    Markdown,
    Website,
    Youtube,
    Arxiv,
}

impl ReaderKind {
    pub const ALL: [ReaderKind; 9] = [
        ReaderKind::Pdf,
        ReaderKind::Csv,
        ReaderKind::Docx,
        ReaderKind::Text,
        ReaderKind::Json,
        ReaderKind::Markdown,
        ReaderKind::Website,
        ReaderKind::Youtube,
        ReaderKind::Arxiv,
    ];

    /// Wire id sent as `reader_id`.
    pub fn id(&self) -> &'static str {
        match self {
            ReaderKind::Pdf => "pdf",
            ReaderKind::Csv => "csv",
            ReaderKind::Docx => "docx",
            ReaderKind::Text => "text",
            ReaderKind::Json => "json",
            ReaderKind::Markdown => "markdown",
            ReaderKind::Website => "website",
            ReaderKind::Youtube => "youtube",
            ReaderKind::Arxiv => "arxiv",
        }
    }

    /// Default reader for a local file, by extension.
    pub fn for_path(path: &Path) -> ReaderKind {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        Self::for_extension(&ext).unwrap_or(ReaderKind::Text)
    }

    /// Default reader for a remote URL: known hosts first, then the path extension.
    pub fn for_url(url: &Url) -> ReaderKind {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        if host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com") {
            return ReaderKind::Youtube;
        }
        if host == "arxiv.org" || host.ends_with(".arxiv.org") {
            return ReaderKind::Arxiv;
        }

        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|last| last.rsplit_once('.'))
            .and_then(|(_, ext)| Self::for_extension(&ext.to_lowercase()))
            .unwrap_or(ReaderKind::Website)
    }

    fn for_extension(ext: &str) -> Option<ReaderKind> {
        match ext {
            "pdf" => Some(ReaderKind::Pdf),
            "csv" => Some(ReaderKind::Csv),
            "docx" | "doc" => Some(ReaderKind::Docx),
            "txt" | "text" | "log" => Some(ReaderKind::Text),
            "json" | "jsonl" => Some(ReaderKind::Json),
            "md" | "markdown" => Some(ReaderKind::Markdown),
            "html" | "htm" => Some(ReaderKind::Website),
            _ => None,
        }
    }
}

impl Display for ReaderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ReaderKind {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ReaderKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| KbError::UnknownReader(s.to_string()))
    }
}
