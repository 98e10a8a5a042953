use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Server-reported lifecycle state of a content item.
///
/// Only the exact wire string `processing` is transitional. Strings the
/// client does not know are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Unknown(String),
}

impl ContentStatus {
    pub fn is_transitional(&self) -> bool {
        matches!(self, ContentStatus::Processing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Processing => "processing",
            ContentStatus::Completed => "completed",
            ContentStatus::Failed => "failed",
            ContentStatus::Unknown(s) => s,
        }
    }
}

impl Display for ContentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => ContentStatus::Pending,
            "processing" => ContentStatus::Processing,
            "completed" => ContentStatus::Completed,
            "failed" => ContentStatus::Failed,
            other => ContentStatus::Unknown(other.to_string()),
        })
    }
}

impl From<String> for ContentStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<ContentStatus> for String {
    fn from(status: ContentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Content item as returned by the list / get / update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, JsonValue>>,
    #[serde(default)]
    pub status: Option<ContentStatus>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    pub fn is_processing(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(ContentStatus::is_transitional)
    }

    /// Metadata rendered as `key=value` strings, string values unquoted.
    pub fn metadata_pairs(&self) -> Vec<(String, String)> {
        self.metadata
            .iter()
            .flatten()
            .map(|(k, v)| {
                let value = match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

/// Response of `GET /knowledge/content/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStatusResponse {
    pub status: ContentStatus,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Partial update body for `PATCH /knowledge/content/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl ContentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.metadata.is_none()
    }
}

/// List endpoints answer either `{"data": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentListResponse {
    Paged { data: Vec<ContentItem> },
    Bare(Vec<ContentItem>),
}

impl ContentListResponse {
    pub fn into_items(self) -> Vec<ContentItem> {
        match self {
            ContentListResponse::Paged { data } => data,
            ContentListResponse::Bare(items) => items,
        }
    }
}

/// Accepts RFC 3339 strings or unix seconds (integer or float).
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    let parsed = match raw {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!(value = %s, error = %e, "Ignoring unparsable timestamp");
                None
            }
        },
        Some(JsonValue::Number(n)) => {
            let secs = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))?;
            Utc.timestamp_opt(secs, 0).single()
        }
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "unsupported timestamp: {}",
                other
            )))
        }
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_exact_match() {
        assert!("processing".parse::<ContentStatus>().unwrap().is_transitional());
        let upper: ContentStatus = "Processing".parse().unwrap();
        assert!(!upper.is_transitional());
        assert_eq!(upper, ContentStatus::Unknown("Processing".to_string()));
    }

    #[test]
    fn test_status_round_trips_unknown_values() {
        let status: ContentStatus = serde_json::from_value(json!("queued")).unwrap();
        assert_eq!(status.to_string(), "queued");
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("queued"));
    }

    #[test]
    fn test_content_item_rfc3339_timestamp() {
        let item: ContentItem = serde_json::from_value(json!({
            "id": "c1",
            "name": "handbook.pdf",
            "type": "pdf",
            "metadata": {"team": "ops", "year": 2024},
            "status": "completed",
            "updated_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(item.content_type.as_deref(), Some("pdf"));
        assert_eq!(item.status, Some(ContentStatus::Completed));
        assert_eq!(item.updated_at.unwrap().timestamp(), 1_714_557_600);
        assert_eq!(
            item.metadata_pairs(),
            vec![
                ("team".to_string(), "ops".to_string()),
                ("year".to_string(), "2024".to_string())
            ]
        );
    }

    #[test]
    fn test_content_item_unix_timestamp_and_missing_fields() {
        let item: ContentItem = serde_json::from_value(json!({
            "id": "c2",
            "status": "processing",
            "updated_at": 1714557600
        }))
        .unwrap();

        assert!(item.is_processing());
        assert_eq!(item.name, "");
        assert!(item.metadata.is_none());
        assert_eq!(item.updated_at.unwrap().timestamp(), 1_714_557_600);
    }

    #[test]
    fn test_unparsable_timestamp_is_dropped() {
        let response: ContentListResponse = serde_json::from_value(json!({"data": [
            {"id": "a", "updated_at": "2024-05-01 10:00:00"},
            {"id": "b", "updated_at": "2024-05-01T10:00:00Z"}
        ]}))
        .unwrap();

        let items = response.into_items();
        assert_eq!(items.len(), 2);
        assert!(items[0].updated_at.is_none());
        assert!(items[1].updated_at.is_some());
    }

    #[test]
    fn test_list_response_shapes() {
        let paged: ContentListResponse =
            serde_json::from_value(json!({"data": [{"id": "a"}], "meta": {"page": 1}})).unwrap();
        assert_eq!(paged.into_items().len(), 1);

        let bare: ContentListResponse =
            serde_json::from_value(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert_eq!(bare.into_items().len(), 2);
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ContentUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "Renamed"}));
        assert!(ContentUpdate::default().is_empty());
    }
}
