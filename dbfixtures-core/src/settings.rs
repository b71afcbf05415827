//! Clap-free settings for the collect pipeline.

use crate::adapters::DEFAULT_MONGO_SHELL;
use crate::pipeline::default_commands;
use crate::ports::AdminCommand;
use camino::Utf8PathBuf;
use dbfixtures_store::{DEFAULT_EXTENSION, FixtureStore};
use dbfixtures_types::Flavour;

/// Fixtures root used when neither config nor flags name one, relative to the
/// working directory.
pub const DEFAULT_FIXTURES_ROOT: &str = "versions";

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

#[derive(Debug, Clone)]
pub struct CollectSettings {
    pub fixtures_root: Utf8PathBuf,
    pub extension: String,

    // Connection
    pub uri: String,
    pub mongo_shell: String,

    /// Commands to capture, in order.
    pub commands: Vec<AdminCommand>,

    /// Skip flavour detection and file fixtures under this flavour.
    pub flavour_override: Option<Flavour>,
}

impl CollectSettings {
    pub fn store(&self) -> FixtureStore {
        FixtureStore::new(self.fixtures_root.clone()).with_extension(self.extension.clone())
    }
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            fixtures_root: Utf8PathBuf::from(DEFAULT_FIXTURES_ROOT),
            extension: DEFAULT_EXTENSION.to_string(),
            uri: DEFAULT_URI.to_string(),
            mongo_shell: DEFAULT_MONGO_SHELL.to_string(),
            commands: default_commands(),
            flavour_override: None,
        }
    }
}
