use serde::{Deserialize, Serialize};

/// A knowledge database the user can target with new content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDatabase {
    pub db_id: String,
    pub display_name: String,
}

/// Response of `GET /config`. Only the knowledge section is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub knowledge: Option<KnowledgeSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeSection {
    #[serde(default)]
    pub dbs: Vec<KnowledgeDbEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeDbEntry {
    pub db_id: String,
    #[serde(default)]
    pub domain_config: Option<DomainConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainConfig {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ConfigResponse {
    /// Databases in server order; the display name falls back to the id.
    pub fn knowledge_databases(&self) -> Vec<KnowledgeDatabase> {
        self.knowledge
            .iter()
            .flat_map(|k| k.dbs.iter())
            .map(|entry| {
                let display_name = entry
                    .domain_config
                    .as_ref()
                    .and_then(|d| d.display_name.as_deref())
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(&entry.db_id)
                    .to_string();
                KnowledgeDatabase {
                    db_id: entry.db_id.clone(),
                    display_name,
                }
            })
            .collect()
    }
}
