//! Note upgrade workflow.
//!
//! # Responsibility
//! - Offer the actions available for a note type.
//! - Create the successor note of an upgrade and link both notes.
//!
//! # Invariants
//! - The new note's `sources` gets a quoted `[[source]]` reference and the
//!   source note's `derived_notes` gets `[[new]]`.
//! - The new note is written before the source note. There is no rollback
//!   when the second write fails.
//! - `upgrade` does not re-check the transition table; callers only offer
//!   the targets returned by `available_actions`.

use crate::model::keyed_value::PropertyValue;
use crate::model::note::Note;
use crate::model::note_type::NoteType;
use crate::model::property::KEY_DERIVED_NOTES;
use crate::prompt::UserPrompt;
use crate::service::factory::{NoteError, NoteFactory};
use crate::vault::{FileHandle, VaultError, VaultStore};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type UpgradeResult<T> = Result<T, UpgradeError>;

#[derive(Debug)]
pub enum UpgradeError {
    NoSourceNote,
    /// The action exists but has no implementation.
    UnsupportedAction(String),
    Note(NoteError),
}

impl Display for UpgradeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSourceNote => write!(f, "select a note first"),
            Self::UnsupportedAction(action) => write!(f, "action not supported yet: {action}"),
            Self::Note(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UpgradeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Note(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteError> for UpgradeError {
    fn from(value: NoteError) -> Self {
        Self::Note(value)
    }
}

impl From<VaultError> for UpgradeError {
    fn from(value: VaultError) -> Self {
        Self::Note(value.into())
    }
}

/// Action offered for a note of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Upgrade(NoteType),
    /// Merge atomic notes. Not implemented.
    MergeAtomic,
    /// Publish a permanent note outside the vault. Not implemented.
    PublishExternally,
}

impl WorkflowAction {
    pub fn label(self) -> String {
        match self {
            Self::Upgrade(target) => format!("Upgrade to {}", target.label()),
            Self::MergeAtomic => "Merge atomic notes".to_string(),
            Self::PublishExternally => "Publish externally".to_string(),
        }
    }
}

/// Result of one upgrade request.
#[derive(Debug)]
pub enum UpgradeOutcome {
    Upgraded { note: Note, file: FileHandle },
    /// The title prompt was cancelled; nothing was written.
    Cancelled,
}

/// Actions available for `note_type`: its upgrade targets, then stubs.
pub fn available_actions(note_type: NoteType) -> Vec<WorkflowAction> {
    let mut actions: Vec<WorkflowAction> = note_type
        .upgrade_targets()
        .iter()
        .copied()
        .map(WorkflowAction::Upgrade)
        .collect();
    match note_type {
        NoteType::Atomic => actions.push(WorkflowAction::MergeAtomic),
        NoteType::Permanent => actions.push(WorkflowAction::PublishExternally),
        NoteType::Fleeting | NoteType::Literature => {}
    }
    actions
}

/// Whether `from -> to` is in the transition table.
pub fn is_upgrade_allowed(from: NoteType, to: NoteType) -> bool {
    from.can_upgrade_to(to)
}

/// Runs upgrades against one factory, store and prompt.
pub struct UpgradeWorkflow<'a> {
    factory: &'a NoteFactory,
    store: &'a dyn VaultStore,
    prompt: &'a dyn UserPrompt,
}

impl<'a> UpgradeWorkflow<'a> {
    pub fn new(
        factory: &'a NoteFactory,
        store: &'a dyn VaultStore,
        prompt: &'a dyn UserPrompt,
    ) -> Self {
        Self {
            factory,
            store,
            prompt,
        }
    }

    /// Runs one offered action on `source`.
    pub fn execute(
        &self,
        source: Option<&mut Note>,
        action: WorkflowAction,
    ) -> UpgradeResult<UpgradeOutcome> {
        match action {
            WorkflowAction::Upgrade(target) => self.upgrade(source, target, None),
            WorkflowAction::MergeAtomic | WorkflowAction::PublishExternally => {
                warn!("event=workflow_action module=service status=unsupported");
                Err(UpgradeError::UnsupportedAction(action.label()))
            }
        }
    }

    /// Creates a `target` note derived from `source` and links both.
    ///
    /// Without an explicit `title` the prompt is asked (when prompting is
    /// enabled); a cancelled prompt ends the upgrade with
    /// [`UpgradeOutcome::Cancelled`] before anything is written.
    pub fn upgrade(
        &self,
        source: Option<&mut Note>,
        target: NoteType,
        title: Option<&str>,
    ) -> UpgradeResult<UpgradeOutcome> {
        let Some(source) = source else {
            error!("event=note_upgrade module=service status=error error_code=no_source_note");
            return Err(UpgradeError::NoSourceNote);
        };
        let settings = self.factory.settings();
        info!(
            "event=note_upgrade module=service status=start from={} to={target}",
            source.get_type()
        );

        let title = match title {
            Some(title) => title.to_string(),
            None => {
                let default_title = format!("New {} Note", target.label());
                if settings.use_prompt_integration {
                    match self.prompt.ask(
                        &format!("Title for the new {} note", target.label()),
                        Some(&default_title),
                    ) {
                        Some(title) => title,
                        None => {
                            info!("event=note_upgrade module=service status=cancelled");
                            return Ok(UpgradeOutcome::Cancelled);
                        }
                    }
                } else {
                    default_title
                }
            }
        };

        let mut note = if self.factory.has_default_template(target) {
            self.factory.create_from_template(self.store, target, None)?
        } else {
            self.factory.create_note(target, None)?
        };
        note.set_path(settings.folder_for(target));
        note.set_title(title);
        if !settings.default_tags.is_empty() {
            note.add_tag(settings.default_tags.clone());
        }

        note.add_source_note(&format!("[[{}]]", source.title()));
        let file = note.save(self.store, self.prompt)?;
        add_derived_note(source, note.title());
        source.rewrite(self.store, self.prompt)?;
        info!(
            "event=note_upgrade module=service status=ok to={target} path={}",
            file.path
        );
        Ok(UpgradeOutcome::Upgraded { note, file })
    }
}

/// Appends `[[title]]` to the source note's `derived_notes` list.
fn add_derived_note(source: &mut Note, title: &str) {
    let reference = format!("[[{title}]]");
    let mut items = match source.get_property(KEY_DERIVED_NOTES) {
        Some(PropertyValue::List(items)) => items.clone(),
        Some(PropertyValue::Text(text)) if !text.trim().is_empty() => vec![text.clone()],
        _ => Vec::new(),
    };
    if items.contains(&reference) {
        return;
    }
    items.push(reference);
    source
        .properties_mut()
        .set_property_value(KEY_DERIVED_NOTES, PropertyValue::List(items), true);
}

#[cfg(test)]
mod tests {
    use super::{add_derived_note, available_actions, is_upgrade_allowed, WorkflowAction};
    use crate::model::note::Note;
    use crate::model::note_type::NoteType;
    use crate::model::property::KEY_DERIVED_NOTES;

    #[test]
    fn actions_follow_transition_table() {
        assert_eq!(
            available_actions(NoteType::Fleeting),
            vec![
                WorkflowAction::Upgrade(NoteType::Literature),
                WorkflowAction::Upgrade(NoteType::Atomic)
            ]
        );
        assert_eq!(
            available_actions(NoteType::Atomic),
            vec![
                WorkflowAction::Upgrade(NoteType::Permanent),
                WorkflowAction::MergeAtomic
            ]
        );
        assert_eq!(
            available_actions(NoteType::Permanent),
            vec![WorkflowAction::PublishExternally]
        );
        assert!(is_upgrade_allowed(NoteType::Literature, NoteType::Permanent));
        assert!(!is_upgrade_allowed(NoteType::Permanent, NoteType::Fleeting));
    }

    #[test]
    fn derived_notes_list_is_created_then_appended() {
        let mut note = Note::zettel(NoteType::Fleeting);
        add_derived_note(&mut note, "A");
        add_derived_note(&mut note, "B");
        add_derived_note(&mut note, "A");
        assert_eq!(note.properties().list(KEY_DERIVED_NOTES), ["[[A]]", "[[B]]"]);
    }
}
