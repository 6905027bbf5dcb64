//! Note workflow services.
//!
//! # Responsibility
//! - Build, load and template notes through the factory.
//! - Run type upgrades between notes.

pub mod factory;
pub mod upgrade;
