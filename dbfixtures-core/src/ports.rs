//! Port traits abstracting the live server away from the resolver and collector.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Database an admin command runs against unless told otherwise.
pub const ADMIN_DB: &str = "admin";

/// A server command such as `{ serverStatus: 1 }`.
///
/// The command name is always the first key of the rendered document; the
/// server dispatches on it.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCommand {
    pub name: String,
    pub value: Value,
    pub db: String,
    pub options: Vec<(String, Value)>,
}

impl AdminCommand {
    /// `{ <name>: 1 }` against the admin database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::from(1),
            db: ADMIN_DB.to_string(),
            options: Vec::new(),
        }
    }

    pub fn on_db(mut self, db: impl Into<String>) -> Self {
        self.db = db.into();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// Renders the command document as JSON text, keys in insertion order.
    pub fn to_document(&self) -> String {
        let mut out = String::from("{");
        let fields = std::iter::once((&self.name, &self.value))
            .chain(self.options.iter().map(|(k, v)| (k, v)));
        for (idx, (key, value)) in fields.enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(&Value::from(key.as_str()).to_string());
            out.push_str(": ");
            out.push_str(&value.to_string());
        }
        out.push('}');
        out
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.to_document())
    }
}

/// A command reply: the raw serialized document plus whether the server said `ok: 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub ok: bool,
    pub raw: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("invalid reply to {command}: {message}")]
    InvalidReply { command: String, message: String },

    #[error("connection unavailable: {message}")]
    Unavailable { message: String },
}

/// An established connection to one server. Dialing and closing belong to the caller.
pub trait ServerConnection {
    /// The server's self-reported build version, e.g. `3.4.13-1.2`.
    fn build_version(&self) -> Result<String, ConnectionError>;

    /// Runs `command` and returns the raw reply.
    ///
    /// A reply with `ok != 1` is still `Ok`; only transport-level failures are errors.
    fn run_command(&self, command: &AdminCommand) -> Result<CommandReply, ConnectionError>;
}
