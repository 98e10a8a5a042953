use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One user-entered metadata tag. Keys may repeat within a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataPair {
    pub key: String,
    pub value: String,
}

impl MetadataPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse `key=value` (as typed on the command line). Splits on the first `=`.
    pub fn parse_assignment(raw: &str) -> Option<Self> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }
}

/// Flatten an ordered pair list into a mapping. Later pairs win on duplicate keys.
pub fn flatten_metadata(pairs: &[MetadataPair]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|pair| (pair.key.clone(), pair.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_last_write_wins() {
        let pairs = vec![
            MetadataPair::new("topic", "billing"),
            MetadataPair::new("owner", "ana"),
            MetadataPair::new("topic", "invoices"),
        ];
        let map = flatten_metadata(&pairs);
        assert_eq!(map.len(), 2);
        assert_eq!(map["topic"], "invoices");
        assert_eq!(map["owner"], "ana");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            MetadataPair::parse_assignment("team = search=v2"),
            Some(MetadataPair::new("team", "search=v2"))
        );
        assert_eq!(MetadataPair::parse_assignment("team"), None);
        assert_eq!(MetadataPair::parse_assignment("=x"), None);
        assert_eq!(MetadataPair::parse_assignment("x="), None);
    }
}
