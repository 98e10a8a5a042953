//! URL and pasted-text entry forms that feed the draft list.

use kbase_core::models::ReaderKind;
use kbase_core::KbError;
use url::Url;

use crate::draft::{DraftId, DraftItem, DraftList, DraftSource};

const TEXT_NAME_MAX_CHARS: usize = 50;

/// Default display name for a URL draft: the last non-empty path segment,
/// or the raw input when the path has none.
pub fn default_name_for_url(raw: &str, url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}

/// Single-line URL input with its validation message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlForm {
    input: String,
    error: Option<String>,
}

impl UrlForm {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Any edit clears a pending validation error right away.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        self.error = None;
    }

    /// Parse the input as an absolute URL and append a draft for it.
    ///
    /// On failure the draft list is untouched and the error message is kept
    /// on the form until the next edit.
    pub fn submit(&mut self, drafts: &mut DraftList) -> Result<DraftId, KbError> {
        let raw = self.input.trim().to_string();
        let url = match Url::parse(&raw) {
            Ok(url) => url,
            Err(e) => {
                let err = KbError::InvalidUrl {
                    input: raw,
                    reason: e.to_string(),
                };
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        let name = default_name_for_url(&raw, &url);
        let reader = ReaderKind::for_url(&url);
        let id = drafts.add(DraftItem::new(DraftSource::Url(raw), name, reader));

        self.input.clear();
        self.error = None;
        Ok(id)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Pasted-text form. Produces exactly one draft per submit, then clears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextForm {
    pub name: String,
    pub description: String,
    pub body: String,
}

impl TextForm {
    /// A blank name falls back to the first line of the body.
    pub fn submit(&mut self, drafts: &mut DraftList) -> Result<DraftId, KbError> {
        if self.body.trim().is_empty() {
            return Err(KbError::EmptyText);
        }

        let form = std::mem::take(self);
        let name = match form.name.trim() {
            "" => first_line_name(&form.body),
            name => name.to_string(),
        };

        let mut draft = DraftItem::new(DraftSource::Text(form.body), name, ReaderKind::Text);
        draft.description = form.description;
        Ok(drafts.add(draft))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn first_line_name(body: &str) -> String {
    let line = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    if line.chars().count() <= TEXT_NAME_MAX_CHARS {
        line.to_string()
    } else {
        let cut: String = line.chars().take(TEXT_NAME_MAX_CHARS - 3).collect();
        format!("{}...", cut)
    }
}
