use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Product variant a server (and its fixtures) belongs to.
///
/// The set is closed: every flavour maps to exactly one directory under the
/// fixtures root, and that name is part of the on-disk format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Flavour {
    /// Upstream MongoDB. Also the fallback when no vendor marker is detected.
    #[default]
    #[serde(rename = "mongodb")]
    MongoDb,

    /// Percona Server for MongoDB.
    #[serde(rename = "psmdb")]
    PerconaServerForMongoDb,
}

impl Flavour {
    pub const ALL: [Flavour; 2] = [Flavour::MongoDb, Flavour::PerconaServerForMongoDb];

    pub fn as_str(self) -> &'static str {
        match self {
            Flavour::MongoDb => "mongodb",
            Flavour::PerconaServerForMongoDb => "psmdb",
        }
    }

    /// Directory name under the fixtures root.
    pub fn dir_name(self) -> &'static str {
        self.as_str()
    }

    pub fn is_vendor_fork(self) -> bool {
        matches!(self, Flavour::PerconaServerForMongoDb)
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flavour '{0}' (expected one of: mongodb, psmdb)")]
pub struct UnknownFlavour(pub String);

impl FromStr for Flavour {
    type Err = UnknownFlavour;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Flavour::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownFlavour(s.to_string()))
    }
}
