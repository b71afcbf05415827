use crate::error::StoreError;
use camino::{Utf8Path, Utf8PathBuf};
use dbfixtures_types::{FixtureKey, Flavour, ServerIdentity, Version};
use fs_err as fs;
use glob::{Pattern, glob};
use std::io;
use tracing::debug;

/// Extension used when none is configured. The collector's shell adapter
/// captures replies as canonical Extended JSON.
pub const DEFAULT_EXTENSION: &str = "json";

/// Filesystem-backed fixture namespace rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: Utf8PathBuf,
    extension: String,
}

impl FixtureStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the fixture file extension. A leading dot is dropped; an empty
    /// extension keeps the current one.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let extension = extension.trim().trim_start_matches('.');
        if !extension.is_empty() {
            self.extension = extension.to_string();
        }
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn directory_for(&self, flavour: Flavour) -> Utf8PathBuf {
        self.root.join(flavour.dir_name())
    }

    pub fn version_dir(
        &self,
        flavour: Flavour,
        version: &Version,
    ) -> Result<Utf8PathBuf, StoreError> {
        validate_segment(version.as_str())?;
        Ok(self.directory_for(flavour).join(version.as_str()))
    }

    pub fn path_for(&self, key: &FixtureKey) -> Result<Utf8PathBuf, StoreError> {
        validate_segment(&key.command)?;
        let dir = self.version_dir(key.flavour, &key.version)?;
        Ok(dir.join(format!("{}.{}", key.command, self.extension)))
    }

    /// Persists `payload` for `command`, replacing any existing fixture for the key.
    ///
    /// The version directory is created on demand; a directory that already
    /// exists (including one created concurrently) is not an error.
    pub fn write(
        &self,
        identity: &ServerIdentity,
        command: &str,
        payload: &[u8],
    ) -> Result<Utf8PathBuf, StoreError> {
        let path = self.path_for(&identity.key(command))?;
        let dir = self.version_dir(identity.flavour, &identity.version)?;

        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        fs::write(&path, payload).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path, bytes = payload.len(), "wrote fixture");
        Ok(path)
    }

    pub fn load(
        &self,
        flavour: Flavour,
        version: &Version,
        command: &str,
    ) -> Result<Vec<u8>, StoreError> {
        self.load_key(&FixtureKey {
            flavour,
            version: version.clone(),
            command: command.to_string(),
        })
    }

    pub fn load_key(&self, key: &FixtureKey) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = fs::read(&path).map_err(|e| StoreError::from_io(path.clone(), e))?;
        debug!(path = %path, bytes = bytes.len(), "loaded fixture");
        Ok(bytes)
    }

    /// Versions stored for `flavour`, in directory-listing order.
    ///
    /// Only immediate subdirectories whose names are already normalized count;
    /// stray files and foreign directory names are skipped.
    pub fn versions(&self, flavour: Flavour) -> Result<Vec<Version>, StoreError> {
        let dir = self.directory_for(flavour);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %dir, "no fixtures stored for flavour");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let file_type = entry.file_type().map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            if !file_type.is_dir() {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                debug!(dir = %dir, "skipping non-utf8 version directory");
                continue;
            };
            let version = Version::normalize(&name);
            if version.as_str() != name {
                debug!(dir = %dir, name = %name, "skipping non-normalized version directory");
                continue;
            }
            out.push(version);
        }
        Ok(out)
    }

    /// [`versions`](Self::versions) filtered through a constraint such as `"> 3.4"`.
    ///
    /// A malformed constraint matches nothing.
    pub fn versions_matching(
        &self,
        flavour: Flavour,
        constraint: &str,
    ) -> Result<Vec<Version>, StoreError> {
        let versions = self.versions(flavour)?;
        Ok(versions
            .into_iter()
            .filter(|v| dbfixtures_version::matches(v.as_str(), constraint))
            .collect())
    }

    /// Command names stored for one version, sorted.
    pub fn commands(&self, flavour: Flavour, version: &Version) -> Result<Vec<String>, StoreError> {
        let dir = self.version_dir(flavour, version)?;
        let pattern = format!("{}/*.{}", Pattern::escape(dir.as_str()), self.extension);

        debug!(pattern = %pattern, "scanning fixtures");

        let paths = glob(&pattern).map_err(|e| StoreError::InvalidSegment {
            segment: pattern.clone(),
            reason: e.msg,
        })?;

        let mut out = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = Utf8PathBuf::from(e.path().to_string_lossy().to_string());
                StoreError::Io {
                    path,
                    source: e.into_error(),
                }
            })?;
            if !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                out.push(stem.to_string());
            }
        }

        out.sort();
        Ok(out)
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    let reason = if segment.is_empty() {
        Some("empty")
    } else if segment == "." || segment == ".." {
        Some("relative directory reference")
    } else if segment.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if segment.contains('\0') {
        Some("contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidSegment {
            segment: segment.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_for_is_root_join_tag() {
        let store = FixtureStore::new("/fixtures/versions");
        assert_eq!(
            store.directory_for(Flavour::PerconaServerForMongoDb),
            Utf8PathBuf::from("/fixtures/versions/psmdb")
        );
        assert_eq!(
            store.directory_for(Flavour::MongoDb),
            Utf8PathBuf::from("/fixtures/versions/mongodb")
        );
    }

    #[test]
    fn path_for_uses_extension() {
        let store = FixtureStore::new("root").with_extension(".bson");
        let key = FixtureKey::new(Flavour::MongoDb, "3.6.0", "serverStatus");
        assert_eq!(
            store.path_for(&key).unwrap(),
            Utf8PathBuf::from("root/mongodb/3.6.0/serverStatus.bson")
        );
    }

    #[test]
    fn empty_extension_keeps_default() {
        for extension in ["", ".", "..", " "] {
            let store = FixtureStore::new("root").with_extension(extension);
            assert_eq!(store.extension(), DEFAULT_EXTENSION, "{extension:?}");
        }
        let key = FixtureKey::new(Flavour::MongoDb, "3.6.0", "top");
        let store = FixtureStore::new("root").with_extension(".");
        assert_eq!(
            store.path_for(&key).unwrap(),
            Utf8PathBuf::from("root/mongodb/3.6.0/top.json")
        );
    }

    #[test]
    fn traversal_segments_rejected() {
        let store = FixtureStore::new("root");
        for command in ["", ".", "..", "../etc/passwd", "a\\b", "nul\0"] {
            let key = FixtureKey::new(Flavour::MongoDb, "3.6.0", command);
            assert!(
                matches!(store.path_for(&key), Err(StoreError::InvalidSegment { .. })),
                "{command:?}"
            );
        }

        let key = FixtureKey::new(Flavour::MongoDb, "..", "top");
        assert!(store.path_for(&key).is_err());
    }
}
