use kbase_core::models::KnowledgeDatabase;

/// Knowledge databases available on the server, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseCatalog {
    databases: Vec<KnowledgeDatabase>,
}

impl DatabaseCatalog {
    pub fn new(databases: Vec<KnowledgeDatabase>) -> Self {
        Self { databases }
    }

    pub fn databases(&self) -> &[KnowledgeDatabase] {
        &self.databases
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn get(&self, db_id: &str) -> Option<&KnowledgeDatabase> {
        self.databases.iter().find(|db| db.db_id == db_id)
    }

    /// The only database, when there is exactly one.
    pub fn single(&self) -> Option<&KnowledgeDatabase> {
        match self.databases.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}
