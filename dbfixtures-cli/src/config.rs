//! Configuration file loading for dbfixtures.
//!
//! Discovers and loads `dbfixtures.toml` from the working directory, or from an
//! explicit `--config` path. CLI arguments take precedence over file settings.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use dbfixtures_core::adapters::DEFAULT_MONGO_SHELL;
use dbfixtures_core::pipeline::default_commands;
use dbfixtures_core::ports::AdminCommand;
use dbfixtures_core::settings::{CollectSettings, DEFAULT_FIXTURES_ROOT, DEFAULT_URI};
use dbfixtures_store::DEFAULT_EXTENSION;
use dbfixtures_types::Flavour;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "dbfixtures.toml";

/// Top-level configuration from dbfixtures.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbfixturesConfig {
    /// Where fixtures live on disk.
    pub store: StoreConfig,

    /// Defaults for `collect`.
    pub collect: CollectConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Fixtures root, relative to the working directory unless absolute.
    pub root: Option<Utf8PathBuf>,

    /// Fixture file extension, without the dot.
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectConfig {
    pub uri: Option<String>,

    /// Shell binary used to talk to the server.
    pub mongo_shell: Option<String>,

    /// Admin commands to capture. Empty means the built-in list.
    pub commands: Vec<String>,
}

/// Discover the dbfixtures.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a dbfixtures.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<DbfixturesConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<DbfixturesConfig> {
    let config: DbfixturesConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<DbfixturesConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(DbfixturesConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub root: Utf8PathBuf,
    pub extension: String,
    pub uri: String,
    pub mongo_shell: String,
    pub commands: Vec<String>,
}

impl MergedConfig {
    /// Settings for one collect run. An empty command list selects the defaults.
    pub fn into_collect_settings(self, flavour_override: Option<Flavour>) -> CollectSettings {
        let commands = if self.commands.is_empty() {
            default_commands()
        } else {
            self.commands.into_iter().map(AdminCommand::new).collect()
        };
        CollectSettings {
            fixtures_root: self.root,
            extension: self.extension,
            uri: self.uri,
            mongo_shell: self.mongo_shell,
            commands,
            flavour_override,
        }
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: DbfixturesConfig,
}

impl ConfigMerger {
    pub fn new(config: DbfixturesConfig) -> Self {
        Self { config }
    }

    /// Merge with the store location flags shared by every subcommand.
    pub fn merge_store_args(self, cli_root: Option<&Utf8Path>) -> MergedConfig {
        self.merge_collect_args(cli_root, None, None, &[])
    }

    /// Merge with collect command CLI arguments.
    ///
    /// A non-empty CLI command list replaces the config file list rather than
    /// extending it.
    pub fn merge_collect_args(
        self,
        cli_root: Option<&Utf8Path>,
        cli_uri: Option<&str>,
        cli_mongo_shell: Option<&str>,
        cli_commands: &[String],
    ) -> MergedConfig {
        let DbfixturesConfig { store, collect } = self.config;

        let root = cli_root
            .map(Utf8Path::to_path_buf)
            .or(store.root)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_FIXTURES_ROOT));

        let commands = if cli_commands.is_empty() {
            collect.commands
        } else {
            cli_commands.to_vec()
        };

        MergedConfig {
            root,
            extension: store
                .extension
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            uri: cli_uri
                .map(str::to_string)
                .or(collect.uri)
                .unwrap_or_else(|| DEFAULT_URI.to_string()),
            mongo_shell: cli_mongo_shell
                .map(str::to_string)
                .or(collect.mongo_shell)
                .unwrap_or_else(|| DEFAULT_MONGO_SHELL.to_string()),
            commands,
        }
    }
}
