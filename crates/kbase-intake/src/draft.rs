//! Local, unsaved draft list.
//!
//! Drafts live only as long as the owning session. Every mutation is keyed by
//! [`DraftId`]; an id that is no longer present turns the call into a no-op
//! (returning `false` / `None`) so stale callbacks cannot disturb other drafts.
//! Insertion order is the only ordering.

use kbase_core::models::{ChunkingConfig, MetadataPair, ReaderKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DraftId(Uuid);

impl DraftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DraftId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Where the draft's content comes from. Exactly one per draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSource {
    File(PathBuf),
    Url(String),
    Text(String),
}

impl DraftSource {
    pub fn kind(&self) -> &'static str {
        match self {
            DraftSource::File(_) => "file",
            DraftSource::Url(_) => "url",
            DraftSource::Text(_) => "text",
        }
    }
}

/// Key/value inputs of a draft's metadata editor, before the pair is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataInput {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    pub id: DraftId,
    pub source: DraftSource,
    pub name: String,
    pub description: String,
    pub reader: ReaderKind,
    pub chunking: ChunkingConfig,
    pub metadata: Vec<MetadataPair>,
    pub metadata_input: MetadataInput,
    pub selected: bool,
    /// Display state only.
    pub expanded: bool,
}

impl DraftItem {
    pub fn new(source: DraftSource, name: impl Into<String>, reader: ReaderKind) -> Self {
        Self {
            id: DraftId::new(),
            source,
            name: name.into(),
            description: String::new(),
            reader,
            chunking: ChunkingConfig::default(),
            metadata: Vec::new(),
            metadata_input: MetadataInput::default(),
            selected: true,
            expanded: false,
        }
    }

    /// Draft for a local file, named after the file and read by extension.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let reader = ReaderKind::for_path(&path);
        Self::new(DraftSource::File(path), name, reader)
    }

    /// Append the pair currently in `metadata_input` and clear the inputs.
    /// No-op unless both key and value are non-empty. Duplicate keys are kept.
    pub fn commit_metadata_input(&mut self) -> bool {
        if self.metadata_input.key.is_empty() || self.metadata_input.value.is_empty() {
            return false;
        }
        let input = std::mem::take(&mut self.metadata_input);
        self.metadata.push(MetadataPair::new(input.key, input.value));
        true
    }

    /// Remove the pair at `index`; out-of-range is a no-op.
    pub fn remove_metadata(&mut self, index: usize) -> bool {
        if index >= self.metadata.len() {
            return false;
        }
        self.metadata.remove(index);
        true
    }
}

/// Field updates for one draft; `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub reader: Option<ReaderKind>,
    pub chunking: Option<ChunkingConfig>,
}

impl DraftPatch {
    fn apply(self, draft: &mut DraftItem) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(reader) = self.reader {
            draft.reader = reader;
        }
        if let Some(chunking) = self.chunking {
            draft.chunking = chunking;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftList {
    items: Vec<DraftItem>,
}

impl DraftList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftItem> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<DraftId> {
        self.items.iter().map(|d| d.id).collect()
    }

    pub fn get(&self, id: DraftId) -> Option<&DraftItem> {
        self.items.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: DraftId) -> Option<&mut DraftItem> {
        self.items.iter_mut().find(|d| d.id == id)
    }

    /// Selected drafts in insertion order.
    pub fn selected(&self) -> impl Iterator<Item = &DraftItem> {
        self.items.iter().filter(|d| d.selected)
    }

    pub fn add(&mut self, draft: DraftItem) -> DraftId {
        let id = draft.id;
        tracing::debug!(draft_id = %id, source = draft.source.kind(), name = %draft.name, "Draft added");
        self.items.push(draft);
        id
    }

    /// One draft per path, in the given order.
    pub fn add_files<I>(&mut self, paths: I) -> Vec<DraftId>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        paths
            .into_iter()
            .map(|path| self.add(DraftItem::from_path(path)))
            .collect()
    }

    pub fn update(&mut self, id: DraftId, patch: DraftPatch) -> bool {
        match self.get_mut(id) {
            Some(draft) => {
                patch.apply(draft);
                true
            }
            None => false,
        }
    }

    /// Irreversible within the session.
    pub fn remove(&mut self, id: DraftId) -> Option<DraftItem> {
        let index = self.items.iter().position(|d| d.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn toggle_selected(&mut self, id: DraftId) -> bool {
        self.get_mut(id)
            .map(|draft| draft.selected = !draft.selected)
            .is_some()
    }

    pub fn toggle_expanded(&mut self, id: DraftId) -> bool {
        self.get_mut(id)
            .map(|draft| draft.expanded = !draft.expanded)
            .is_some()
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for draft in &mut self.items {
            draft.selected = selected;
        }
    }

    pub fn set_metadata_input(
        &mut self,
        id: DraftId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.get_mut(id) {
            Some(draft) => {
                draft.metadata_input = MetadataInput {
                    key: key.into(),
                    value: value.into(),
                };
                true
            }
            None => false,
        }
    }

    /// See [`DraftItem::commit_metadata_input`].
    pub fn add_metadata(&mut self, id: DraftId) -> bool {
        self.get_mut(id)
            .is_some_and(DraftItem::commit_metadata_input)
    }

    pub fn remove_metadata(&mut self, id: DraftId, index: usize) -> bool {
        self.get_mut(id)
            .is_some_and(|draft| draft.remove_metadata(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_draft(name: &str) -> DraftItem {
        DraftItem::new(
            DraftSource::Text(format!("body of {}", name)),
            name,
            ReaderKind::Text,
        )
    }

    fn names(list: &DraftList) -> Vec<&str> {
        list.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_add_files_one_draft_per_path() {
        let mut list = DraftList::new();
        let ids = list.add_files(vec![
            PathBuf::from("/tmp/report.pdf"),
            PathBuf::from("/tmp/notes.md"),
        ]);

        assert_eq!(ids.len(), 2);
        assert_eq!(names(&list), vec!["report.pdf", "notes.md"]);
        let first = list.get(ids[0]).unwrap();
        assert_eq!(first.reader, ReaderKind::Pdf);
        assert!(first.selected);
        assert!(!first.expanded);
    }

    #[test]
    fn test_remove_preserves_order_of_the_rest() {
        let mut list = DraftList::new();
        let a = list.add(text_draft("a"));
        let b = list.add(text_draft("b"));
        let c = list.add(text_draft("c"));

        let removed = list.remove(b).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(names(&list), vec!["a", "c"]);
        assert_eq!(list.ids(), vec![a, c]);
    }

    #[test]
    fn test_operations_on_missing_id_are_noops() {
        let mut list = DraftList::new();
        list.add(text_draft("a"));
        let before = list.iter().cloned().collect::<Vec<_>>();
        let stale = DraftId::new();

        assert!(list.remove(stale).is_none());
        assert!(!list.toggle_selected(stale));
        assert!(!list.toggle_expanded(stale));
        assert!(!list.update(
            stale,
            DraftPatch {
                name: Some("x".to_string()),
                ..Default::default()
            }
        ));
        assert!(!list.set_metadata_input(stale, "k", "v"));
        assert!(!list.add_metadata(stale));
        assert!(!list.remove_metadata(stale, 0));

        assert_eq!(list.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_update_and_toggles_touch_only_target() {
        let mut list = DraftList::new();
        let a = list.add(text_draft("a"));
        let b = list.add(text_draft("b"));

        assert!(list.update(
            a,
            DraftPatch {
                name: Some("renamed".to_string()),
                reader: Some(ReaderKind::Markdown),
                ..Default::default()
            }
        ));
        assert!(list.toggle_selected(a));
        assert!(list.toggle_expanded(a));

        let a_item = list.get(a).unwrap();
        assert_eq!(a_item.name, "renamed");
        assert_eq!(a_item.reader, ReaderKind::Markdown);
        assert!(!a_item.selected);
        assert!(a_item.expanded);

        let b_item = list.get(b).unwrap();
        assert_eq!(b_item.name, "b");
        assert!(b_item.selected);
        assert!(!b_item.expanded);

        assert_eq!(list.selected().count(), 1);
        list.set_all_selected(true);
        assert_eq!(list.selected().count(), 2);
    }

    #[test]
    fn test_metadata_add_requires_key_and_value() {
        let mut list = DraftList::new();
        let id = list.add(text_draft("a"));

        for (key, value) in [("", ""), ("topic", ""), ("", "billing")] {
            list.set_metadata_input(id, key, value);
            assert!(!list.add_metadata(id));
            assert!(list.get(id).unwrap().metadata.is_empty());
        }

        list.set_metadata_input(id, "topic", "billing");
        assert!(list.add_metadata(id));
        let draft = list.get(id).unwrap();
        assert_eq!(draft.metadata, vec![MetadataPair::new("topic", "billing")]);
        assert_eq!(draft.metadata_input, MetadataInput::default());
    }

    #[test]
    fn test_metadata_duplicates_kept_and_removed_by_index() {
        let mut list = DraftList::new();
        let id = list.add(text_draft("a"));

        for value in ["one", "two", "three"] {
            list.set_metadata_input(id, "tag", value);
            assert!(list.add_metadata(id));
        }
        assert_eq!(list.get(id).unwrap().metadata.len(), 3);

        assert!(list.remove_metadata(id, 1));
        assert!(!list.remove_metadata(id, 5));
        let values: Vec<_> = list
            .get(id)
            .unwrap()
            .metadata
            .iter()
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(values, vec!["one", "three"]);
    }
}
