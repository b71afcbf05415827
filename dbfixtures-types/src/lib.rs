//! Shared DTOs for the dbfixtures workspace.
//!
//! # Design constraints
//! - Flavour tags and version strings double as on-disk directory names.
//!   Changing either renames existing fixture trees.
//! - The collect summary is serialized for humans and scripts; prefer adding
//!   optional fields over changing semantics.

pub mod flavour;
pub mod identity;
pub mod summary;

pub use flavour::{Flavour, UnknownFlavour};
pub use identity::{FixtureKey, ServerIdentity, Version};
pub use summary::{CollectSummary, CollectedFixture, ToolInfo};

/// Schema identifiers.
pub mod schema {
    pub const DBFIXTURES_COLLECT_V1: &str = "dbfixtures.collect.v1";
}
