//! Fixture collection pipeline, extracted from the CLI.
//!
//! The live server is reached only through [`ServerConnection`]; fixtures go
//! through [`FixtureStore`]. A run is a one-shot batch and fails fast: the
//! first command that cannot be run or stored aborts it, leaving the fixtures
//! written so far in place.

use crate::ports::{AdminCommand, ServerConnection};
use crate::resolver::resolve;
use crate::settings::CollectSettings;
use anyhow::Context;
use chrono::Utc;
use dbfixtures_store::FixtureStore;
use dbfixtures_types::{CollectSummary, CollectedFixture, ServerIdentity, ToolInfo};
use tracing::{debug, info};

/// Introspection commands captured by default, each run as `{ <name>: 1 }` on admin.
pub const DEFAULT_COMMANDS: &[&str] = &[
    "currentOp",
    "getCmdLineOpts",
    "hostInfo",
    "isMaster",
    "listCollections",
    "listDatabases",
    "replSetGetConfig",
    "replSetGetStatus",
    "serverStatus",
    "top",
];

pub fn default_commands() -> Vec<AdminCommand> {
    DEFAULT_COMMANDS
        .iter()
        .map(|name| AdminCommand::new(*name))
        .collect()
}

/// Resolves the identity to file fixtures under, honouring a flavour override.
pub fn collect_identity(
    settings: &CollectSettings,
    conn: &dyn ServerConnection,
) -> anyhow::Result<ServerIdentity> {
    match settings.flavour_override {
        Some(flavour) => {
            let raw = conn.build_version().context("read server build version")?;
            debug!(flavour = %flavour, raw = %raw, "flavour overridden, skipping probe");
            Ok(ServerIdentity::new(flavour, raw))
        }
        None => resolve(conn).context("resolve server identity"),
    }
}

/// Runs every configured command against `conn` and stores each reply.
pub fn run_collect(
    settings: &CollectSettings,
    conn: &dyn ServerConnection,
    store: &FixtureStore,
    tool: ToolInfo,
) -> anyhow::Result<CollectSummary> {
    let identity = collect_identity(settings, conn)?;
    info!(identity = %identity, root = %store.root(), "collecting fixtures");

    let mut summary = CollectSummary::new(tool, identity.clone(), store.root().to_path_buf());

    for command in &settings.commands {
        info!("running command on db {}: '{}'", command.db, command.to_document());

        let reply = conn
            .run_command(command)
            .with_context(|| format!("run {command}"))?;
        if !reply.ok {
            anyhow::bail!(
                "server rejected {command}: {}",
                String::from_utf8_lossy(&reply.raw)
            );
        }

        let path = store
            .write(&identity, &command.name, &reply.raw)
            .with_context(|| format!("store fixture for {}", command.name))?;

        summary.fixtures.push(CollectedFixture {
            command: command.name.clone(),
            path,
            bytes: reply.raw.len() as u64,
        });
    }

    summary.ended_at = Some(Utc::now());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryConnection;
    use camino::Utf8PathBuf;
    use dbfixtures_types::{Flavour, Version};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "dbfixtures".to_string(),
            version: None,
        }
    }

    fn temp_store(temp: &TempDir) -> FixtureStore {
        let root = Utf8PathBuf::from_path_buf(temp.path().join("versions")).expect("utf8");
        FixtureStore::new(root)
    }

    fn settings_for(commands: &[&str]) -> CollectSettings {
        CollectSettings {
            commands: commands.iter().map(|c| AdminCommand::new(*c)).collect(),
            ..CollectSettings::default()
        }
    }

    #[test]
    fn default_commands_target_admin() {
        let commands = default_commands();
        assert_eq!(commands.len(), DEFAULT_COMMANDS.len());
        assert!(commands.iter().all(|c| c.db == "admin"));
        assert_eq!(commands[0].to_document(), r#"{"currentOp": 1}"#);
    }

    #[test]
    fn collect_writes_every_reply_under_resolved_identity() {
        let temp = TempDir::new().expect("temp dir");
        let store = temp_store(&temp);
        let conn = InMemoryConnection::new("3.4.13-1.2")
            .with_reply("getParameter", true, br#"{"ok":1}"#.to_vec())
            .with_reply("hostInfo", true, br#"{"system":{},"ok":1}"#.to_vec())
            .with_reply("top", true, br#"{"totals":{},"ok":1}"#.to_vec());

        let summary = run_collect(&settings_for(&["hostInfo", "top"]), &conn, &store, tool())
            .expect("collect");

        assert_eq!(
            summary.identity,
            ServerIdentity::new(Flavour::PerconaServerForMongoDb, "3.4.13")
        );
        assert_eq!(summary.fixtures.len(), 2);
        assert!(summary.ended_at.is_some());

        let loaded = store
            .load(
                Flavour::PerconaServerForMongoDb,
                &Version::from("3.4.13"),
                "top",
            )
            .unwrap();
        assert_eq!(loaded, br#"{"totals":{},"ok":1}"#.to_vec());
        assert_eq!(conn.calls(), vec!["getParameter", "hostInfo", "top"]);
    }

    #[test]
    fn collect_fails_fast_and_keeps_earlier_fixtures() {
        let temp = TempDir::new().expect("temp dir");
        let store = temp_store(&temp);
        let conn = InMemoryConnection::new("4.0.3")
            .with_reply("hostInfo", true, br#"{"ok":1}"#.to_vec())
            .with_failure("listDatabases", "socket closed")
            .with_reply("top", true, br#"{"ok":1}"#.to_vec());

        let err = run_collect(
            &settings_for(&["hostInfo", "listDatabases", "top"]),
            &conn,
            &store,
            tool(),
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("listDatabases"));
        let version = Version::from("4.0.3");
        assert_eq!(
            store.commands(Flavour::MongoDb, &version).unwrap(),
            vec!["hostInfo"]
        );
        assert_eq!(conn.calls(), vec!["hostInfo", "listDatabases"]);
    }

    #[test]
    fn collect_treats_rejected_command_as_failure() {
        let temp = TempDir::new().expect("temp dir");
        let store = temp_store(&temp);
        let conn = InMemoryConnection::new("4.0.3");

        let err = run_collect(&settings_for(&["replSetGetStatus"]), &conn, &store, tool())
            .unwrap_err();
        assert!(err.to_string().contains("server rejected"));
        assert!(store.versions(Flavour::MongoDb).unwrap().is_empty());
    }

    #[test]
    fn flavour_override_skips_probe() {
        let temp = TempDir::new().expect("temp dir");
        let store = temp_store(&temp);
        let conn = InMemoryConnection::new("3.6.8-2.0")
            .with_failure("getParameter", "must not probe")
            .with_reply("top", true, br#"{"ok":1}"#.to_vec());
        let settings = CollectSettings {
            flavour_override: Some(Flavour::PerconaServerForMongoDb),
            ..settings_for(&["top"])
        };

        let summary = run_collect(&settings, &conn, &store, tool()).expect("collect");
        assert_eq!(summary.identity.flavour, Flavour::PerconaServerForMongoDb);
        assert_eq!(summary.identity.version.as_str(), "3.6.8");
        assert_eq!(conn.calls(), vec!["top"]);
    }

    #[test]
    fn identity_failure_aborts_before_any_command() {
        let temp = TempDir::new().expect("temp dir");
        let store = temp_store(&temp);
        let conn = InMemoryConnection::failing_build_info("connection refused");

        let err = run_collect(&settings_for(&["top"]), &conn, &store, tool()).unwrap_err();
        assert!(format!("{err:#}").contains("resolve server identity"));
        assert!(conn.calls().is_empty());
    }
}
