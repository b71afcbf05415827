//! Default `ServerConnection` implementations.

use crate::ports::{AdminCommand, CommandReply, ConnectionError, ServerConnection};
use serde_json::Value;
use std::collections::BTreeMap;
use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

/// Shell used when none is configured.
pub const DEFAULT_MONGO_SHELL: &str = "mongosh";

/// Talks to a server by running `mongosh <uri> --quiet --eval <script>`.
///
/// Every reply is printed as canonical Extended JSON, so stored fixtures keep
/// BSON type information (`{"$numberLong": "..."}` and friends).
#[derive(Debug, Clone)]
pub struct ShellConnection {
    uri: String,
    program: String,
}

impl ShellConnection {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            program: DEFAULT_MONGO_SHELL.to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn eval(&self, script: &str) -> Result<Vec<u8>, ConnectionError> {
        debug!(program = %self.program, script = %script, "running shell eval");
        let output = Command::new(&self.program)
            .arg(&self.uri)
            .args(["--quiet", "--eval", script])
            .output()
            .map_err(|source| ConnectionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConnectionError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(last_line(&output.stdout).to_vec())
    }
}

impl ServerConnection for ShellConnection {
    fn build_version(&self) -> Result<String, ConnectionError> {
        let command = AdminCommand::new("buildInfo");
        let raw = self.eval(&eval_script(&command))?;
        parse_build_version(&raw)
    }

    fn run_command(&self, command: &AdminCommand) -> Result<CommandReply, ConnectionError> {
        let raw = self.eval(&eval_script(command))?;
        parse_reply(&command.name, raw)
    }
}

fn eval_script(command: &AdminCommand) -> String {
    format!(
        "print(EJSON.stringify(db.getSiblingDB({}).runCommand({}), {{ relaxed: false }}))",
        Value::from(command.db.as_str()),
        command.to_document()
    )
}

/// Last non-empty line of shell output; banners and warnings come first.
fn last_line(stdout: &[u8]) -> &[u8] {
    stdout
        .split(|b| *b == b'\n')
        .map(|line| line.trim_ascii())
        .rfind(|line| !line.is_empty())
        .unwrap_or_default()
}

/// Interprets a reply document, keeping `raw` untouched as the payload.
pub fn parse_reply(command: &str, raw: Vec<u8>) -> Result<CommandReply, ConnectionError> {
    let doc: Value = serde_json::from_slice(&raw).map_err(|e| ConnectionError::InvalidReply {
        command: command.to_string(),
        message: e.to_string(),
    })?;
    let ok = doc.get("ok").is_some_and(is_ok_value);
    Ok(CommandReply { ok, raw })
}

/// Extracts `version` from a `buildInfo` reply.
pub fn parse_build_version(raw: &[u8]) -> Result<String, ConnectionError> {
    let invalid = |message: String| ConnectionError::InvalidReply {
        command: "buildInfo".to_string(),
        message,
    };
    let doc: Value = serde_json::from_slice(raw).map_err(|e| invalid(e.to_string()))?;
    doc.get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid("missing string field 'version'".to_string()))
}

/// `ok` is a double in BSON; canonical Extended JSON wraps numbers in type objects.
fn is_ok_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::Object(map) => ["$numberDouble", "$numberInt", "$numberLong"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<f64>().ok())
            == Some(1.0),
        _ => false,
    }
}

/// In-memory connection for embedding and testing.
///
/// Commands without a scripted reply answer like a server that does not know
/// them: `ok: 0`, which is an answer rather than an error.
#[derive(Debug)]
pub struct InMemoryConnection {
    build_version: Result<String, String>,
    replies: BTreeMap<String, Result<CommandReply, String>>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryConnection {
    pub fn new(build_version: impl Into<String>) -> Self {
        Self {
            build_version: Ok(build_version.into()),
            replies: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_build_info(message: impl Into<String>) -> Self {
        Self {
            build_version: Err(message.into()),
            replies: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, command: impl Into<String>, ok: bool, raw: Vec<u8>) -> Self {
        self.replies
            .insert(command.into(), Ok(CommandReply { ok, raw }));
        self
    }

    /// Makes `command` fail at the transport level.
    pub fn with_failure(mut self, command: impl Into<String>, message: impl Into<String>) -> Self {
        self.replies.insert(command.into(), Err(message.into()));
        self
    }

    /// Command names run so far, in order. `buildInfo` is not recorded.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ServerConnection for InMemoryConnection {
    fn build_version(&self) -> Result<String, ConnectionError> {
        self.build_version
            .clone()
            .map_err(|message| ConnectionError::Unavailable { message })
    }

    fn run_command(&self, command: &AdminCommand) -> Result<CommandReply, ConnectionError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.name.clone());
        }
        match self.replies.get(&command.name) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(ConnectionError::Unavailable {
                message: message.clone(),
            }),
            None => Ok(CommandReply {
                ok: false,
                raw: format!(
                    r#"{{"ok":0,"errmsg":"no such command: '{}'"}}"#,
                    command.name
                )
                .into_bytes(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_reply_reads_canonical_ok() {
        let raw = br#"{"ok":{"$numberDouble":"1.0"},"uptime":{"$numberLong":"42"}}"#.to_vec();
        let reply = parse_reply("serverStatus", raw.clone()).unwrap();
        assert!(reply.ok);
        assert_eq!(reply.raw, raw);
    }

    #[test]
    fn parse_reply_accepts_relaxed_and_int_forms() {
        assert!(parse_reply("a", br#"{"ok":1}"#.to_vec()).unwrap().ok);
        assert!(parse_reply("a", br#"{"ok":1.0}"#.to_vec()).unwrap().ok);
        assert!(parse_reply("a", br#"{"ok":{"$numberInt":"1"}}"#.to_vec()).unwrap().ok);
        assert!(parse_reply("a", br#"{"ok":true}"#.to_vec()).unwrap().ok);
    }

    #[test]
    fn parse_reply_treats_zero_or_missing_ok_as_not_ok() {
        let zero = br#"{"ok":{"$numberDouble":"0.0"},"errmsg":"no option found"}"#.to_vec();
        assert!(!parse_reply("getParameter", zero).unwrap().ok);
        assert!(!parse_reply("x", br#"{"n":1}"#.to_vec()).unwrap().ok);
    }

    #[test]
    fn parse_reply_rejects_non_json() {
        let err = parse_reply("top", b"MongoNetworkError: connect ECONNREFUSED".to_vec())
            .unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidReply { .. }));
        assert!(err.to_string().contains("top"));
    }

    #[test]
    fn parse_build_version_reads_version_field() {
        let raw = br#"{"version":"3.4.13-1.2","gitVersion":"abc","ok":{"$numberDouble":"1.0"}}"#;
        assert_eq!(parse_build_version(raw).unwrap(), "3.4.13-1.2");
        assert!(parse_build_version(br#"{"ok":1}"#).is_err());
    }

    #[test]
    fn last_line_skips_trailing_blank_lines() {
        assert_eq!(last_line(b"warning: x\n{\"ok\":1}\n\n"), b"{\"ok\":1}");
        assert_eq!(last_line(b""), b"");
    }

    #[test]
    fn eval_script_targets_db_and_document() {
        let script = eval_script(&AdminCommand::new("top"));
        assert_eq!(
            script,
            r#"print(EJSON.stringify(db.getSiblingDB("admin").runCommand({"top": 1}), { relaxed: false }))"#
        );
    }

    #[test]
    fn missing_shell_binary_is_spawn_error() {
        let conn = ShellConnection::new("mongodb://localhost:27017")
            .with_program("dbfixtures-no-such-shell-binary");
        assert!(matches!(
            conn.build_version(),
            Err(ConnectionError::Spawn { .. })
        ));
    }

    #[test]
    fn in_memory_unknown_command_answers_not_ok() {
        let conn = InMemoryConnection::new("4.0.0");
        let reply = conn.run_command(&AdminCommand::new("fsync")).unwrap();
        assert!(!reply.ok);
        assert_eq!(conn.calls(), vec!["fsync".to_string()]);
    }

    #[test]
    fn in_memory_failure_is_unavailable() {
        let conn = InMemoryConnection::new("4.0.0").with_failure("top", "socket closed");
        assert!(matches!(
            conn.run_command(&AdminCommand::new("top")),
            Err(ConnectionError::Unavailable { .. })
        ));
    }

    #[cfg(unix)]
    mod fake_shell {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn fake_shell(temp: &TempDir, body: &str) -> String {
            let path = temp.path().join("fake-mongosh");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("chmod");
            path.to_string_lossy().to_string()
        }

        #[test]
        fn shell_connection_reads_last_stdout_line() {
            let temp = TempDir::new().expect("temp dir");
            let program = fake_shell(
                &temp,
                r#"echo 'Current Mongosh Log ID: 1234'
echo '{"version":"3.4.13-1.2","ok":{"$numberDouble":"1.0"}}'"#,
            );
            let conn = ShellConnection::new("mongodb://fake").with_program(program);

            assert_eq!(conn.build_version().unwrap(), "3.4.13-1.2");
            let reply = conn.run_command(&AdminCommand::new("buildInfo")).unwrap();
            assert!(reply.ok);
            assert!(reply.raw.starts_with(b"{\"version\""));
        }

        #[test]
        fn shell_connection_non_zero_exit_is_command_failed() {
            let temp = TempDir::new().expect("temp dir");
            let program = fake_shell(&temp, "echo 'MongoServerSelectionError' >&2\nexit 1");
            let conn = ShellConnection::new("mongodb://fake").with_program(program);

            let err = conn.run_command(&AdminCommand::new("top")).unwrap_err();
            match err {
                ConnectionError::CommandFailed { stderr, .. } => {
                    assert_eq!(stderr, "MongoServerSelectionError");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
