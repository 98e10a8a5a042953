use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::KbError;

pub const DEFAULT_CHUNK_SIZE: u32 = 5000;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 0;

/// Post-read splitting strategy applied by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkerKind {
    #[default]
    FixedSize,
    Recursive,
    Document,
    Markdown,
    Semantic,
    Agentic,
    Row,
}

impl ChunkerKind {
    pub const ALL: [ChunkerKind; 7] = [
        ChunkerKind::FixedSize,
        ChunkerKind::Recursive,
        ChunkerKind::Document,
        ChunkerKind::Markdown,
        ChunkerKind::Semantic,
        ChunkerKind::Agentic,
        ChunkerKind::Row,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ChunkerKind::FixedSize => "fixed_size",
            ChunkerKind::Recursive => "recursive",
            ChunkerKind::Document => "document",
            ChunkerKind::Markdown => "markdown",
            ChunkerKind::Semantic => "semantic",
            ChunkerKind::Agentic => "agentic",
            ChunkerKind::Row => "row",
        }
    }
}

impl Display for ChunkerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ChunkerKind {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ChunkerKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| KbError::UnknownChunker(s.to_string()))
    }
}

/// Optional chunking override for a draft. Ignored unless `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub enabled: bool,
    pub kind: ChunkerKind,
    pub size: u32,
    pub overlap: u32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: ChunkerKind::default(),
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn enabled(kind: ChunkerKind, size: u32, overlap: u32) -> Self {
        Self {
            enabled: true,
            kind,
            size,
            overlap,
        }
    }

    /// Disabled settings are always valid.
    pub fn validate(&self) -> Result<(), KbError> {
        if !self.enabled {
            return Ok(());
        }
        if self.size == 0 {
            return Err(KbError::InvalidChunking(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if self.overlap >= self.size {
            return Err(KbError::InvalidChunking(format!(
                "overlap {} must be smaller than chunk size {}",
                self.overlap, self.size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled_fixed_size() {
        let config = ChunkingConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.kind, ChunkerKind::FixedSize);
        assert_eq!(config.size, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disabled_skips_validation() {
        let config = ChunkingConfig {
            enabled: false,
            size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(ChunkingConfig::enabled(ChunkerKind::Recursive, 1000, 200)
            .validate()
            .is_ok());
        assert!(ChunkingConfig::enabled(ChunkerKind::Recursive, 1000, 1000)
            .validate()
            .is_err());
        assert!(ChunkingConfig::enabled(ChunkerKind::Recursive, 0, 0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_parse_chunker() {
        assert_eq!(
            "fixed-size".parse::<ChunkerKind>().unwrap(),
            ChunkerKind::FixedSize
        );
        assert_eq!("Semantic".parse::<ChunkerKind>().unwrap(), ChunkerKind::Semantic);
        assert!("sliding".parse::<ChunkerKind>().is_err());
    }
}
