//! Zettelkasten note workflow core.
//!
//! Note model, text codec, template-aware factory and upgrade workflow,
//! persisted through a pluggable vault store.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod service;
pub mod settings;
pub mod vault;

pub use codec::{parse_note_text, ParsedNote};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::blueprint::{
    generate_date, generate_zettel_id, BasicBlueprint, NoteBlueprint, ZettelBlueprint,
};
pub use model::body::{Body, BodySection};
pub use model::keyed_value::{KeyedValue, PropertyValue};
pub use model::link::{LinkForm, NoteLink};
pub use model::note::{sanitize_title, Note};
pub use model::note_type::NoteType;
pub use model::property::PropertySet;
pub use prompt::{NoPrompt, ScriptedPrompt, UserPrompt};
pub use service::factory::{NoteError, NoteFactory, NoteResult, TemplateSource, VaultStats};
pub use service::upgrade::{
    available_actions, is_upgrade_allowed, UpgradeError, UpgradeOutcome, UpgradeResult,
    UpgradeWorkflow, WorkflowAction,
};
pub use settings::{SettingsError, ZettelSettings};
pub use vault::{
    FileHandle, FsVaultStore, MemoryVaultStore, SqliteVaultStore, VaultError, VaultResult,
    VaultStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
