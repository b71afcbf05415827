use crate::identity::ServerIdentity;
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Outcome of one fixture collection run against a live server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectSummary {
    /// Schema identifier, always [`crate::schema::DBFIXTURES_COLLECT_V1`] when produced here.
    pub schema: String,

    pub tool: ToolInfo,

    pub identity: ServerIdentity,

    /// Fixtures root the run wrote into.
    pub root: Utf8PathBuf,

    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub fixtures: Vec<CollectedFixture>,
}

impl CollectSummary {
    pub fn new(tool: ToolInfo, identity: ServerIdentity, root: Utf8PathBuf) -> Self {
        Self {
            schema: crate::schema::DBFIXTURES_COLLECT_V1.to_string(),
            tool,
            identity,
            root,
            started_at: Utc::now(),
            ended_at: None,
            fixtures: Vec::new(),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.fixtures.iter().map(|f| f.bytes).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedFixture {
    pub command: String,
    pub path: Utf8PathBuf,
    pub bytes: u64,
}
