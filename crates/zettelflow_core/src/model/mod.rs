//! Note domain model.
//!
//! # Responsibility
//! - Define the value types notes are composed of.
//! - Define the `Note` entity and the per-type blueprints seeding it.
//!
//! # Invariants
//! - Rendering is a pure function of the model, except for the blueprint
//!   hooks run by `Note::to_text`.

pub mod blueprint;
pub mod body;
pub mod keyed_value;
pub mod link;
pub mod note;
pub mod note_type;
pub mod property;
