use crate::flavour::Flavour;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized server version, usable as a directory name.
///
/// Anything from the first `-` onward (pre-release or vendor build suffix) is
/// discarded, so `3.4.13-1.2` and `3.4.13-rc0` both collapse to `3.4.13`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Version(String);

impl Version {
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let base = match trimmed.split_once('-') {
            Some((prefix, _suffix)) => prefix,
            None => trimmed,
        };
        Version(base.to_string())
    }

    /// Returns the build suffix that `normalize` would strip, if any.
    pub fn suffix_of(raw: &str) -> Option<&str> {
        raw.trim().split_once('-').map(|(_, suffix)| suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Version::normalize(raw)
    }
}

impl From<String> for Version {
    fn from(raw: String) -> Self {
        Version::normalize(&raw)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The (flavour, version) pair a live server resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerIdentity {
    pub flavour: Flavour,
    pub version: Version,
}

impl ServerIdentity {
    pub fn new(flavour: Flavour, version: impl Into<Version>) -> Self {
        Self {
            flavour,
            version: version.into(),
        }
    }

    pub fn key(&self, command: impl Into<String>) -> FixtureKey {
        FixtureKey {
            flavour: self.flavour,
            version: self.version.clone(),
            command: command.into(),
        }
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.flavour, self.version)
    }
}

/// Address of exactly one stored payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureKey {
    pub flavour: Flavour,
    pub version: Version,
    pub command: String,
}

impl FixtureKey {
    pub fn new(flavour: Flavour, version: impl Into<Version>, command: impl Into<String>) -> Self {
        Self {
            flavour,
            version: version.into(),
            command: command.into(),
        }
    }

    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity {
            flavour: self.flavour,
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.flavour, self.version, self.command)
    }
}
