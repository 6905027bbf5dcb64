//! Outbound link descriptors executed after a note is saved.

use crate::vault::{VaultResult, VaultStore, NOTE_EXTENSION};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#+)\s+(.+)$").expect("valid heading regex"));

/// Rendering form of an inserted reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkForm {
    /// `- [[note]]`
    List,
    /// `- [ ] [[note]]`
    Checklist,
}

/// Request to insert a reference to the saved note into another note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLink {
    pub target_note: String,
    pub header: Option<String>,
    pub form: Option<LinkForm>,
}

impl NoteLink {
    pub fn new(
        target_note: impl Into<String>,
        header: Option<String>,
        form: Option<LinkForm>,
    ) -> Self {
        Self {
            target_note: target_note.into(),
            header,
            form,
        }
    }

    /// Vault path of the target note (`<target>.md`).
    pub fn target_path(&self) -> String {
        let suffix = format!(".{NOTE_EXTENSION}");
        if self.target_note.ends_with(&suffix) {
            self.target_note.clone()
        } else {
            format!("{}{suffix}", self.target_note)
        }
    }

    /// Renders the reference line for `source_title`.
    pub fn format_link(&self, source_title: &str) -> String {
        let link = format!("[[{source_title}]]");
        match self.form {
            Some(LinkForm::List) => format!("- {link}"),
            Some(LinkForm::Checklist) => format!("- [ ] {link}"),
            None => link,
        }
    }

    /// Inserts a reference to `source_title` into the target note.
    ///
    /// Returns `false` without error when the target file does not exist.
    pub fn apply(&self, source_title: &str, store: &dyn VaultStore) -> VaultResult<bool> {
        let path = self.target_path();
        if !store.exists(&path)? {
            warn!("event=link_apply module=model status=skipped reason=target_missing");
            return Ok(false);
        }
        let content = store.read(&path)?;
        let line = self.format_link(source_title);
        let updated = insert_link(&content, &line, self.header.as_deref());
        store.write(&path, &updated)?;
        info!("event=link_apply module=model status=ok");
        Ok(true)
    }
}

/// Inserts `line` at the end of the section named `header`, or at the end of
/// `content` when no header is given or found.
fn insert_link(content: &str, line: &str, header: Option<&str>) -> String {
    let Some(header) = header.map(str::trim).filter(|header| !header.is_empty()) else {
        return format!("{content}\n\n{line}");
    };

    let lines: Vec<&str> = content.lines().collect();
    let Some(start) = lines.iter().position(|candidate| {
        HEADING_RE
            .captures(candidate)
            .and_then(|caps| caps.get(2))
            .is_some_and(|name| name.as_str().trim() == header)
    }) else {
        return format!("{content}\n\n{line}");
    };

    let mut end = lines[start + 1..]
        .iter()
        .position(|candidate| HEADING_RE.is_match(candidate))
        .map_or(lines.len(), |offset| start + 1 + offset);
    while end > start + 1 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }

    let mut output: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    output.extend_from_slice(&lines[..end]);
    output.push(line);
    output.extend_from_slice(&lines[end..]);
    let mut rendered = output.join("\n");
    if content.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}
