use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested fixture file does not exist.
    #[error("fixture not found: {path}")]
    NotFound { path: Utf8PathBuf },

    #[error("io error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A version or command would escape its directory or is not a plain name.
    #[error("invalid path segment '{segment}': {reason}")]
    InvalidSegment {
        segment: String,
        reason: &'static str,
    },
}

impl StoreError {
    pub(crate) fn from_io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound { path }
        } else {
            StoreError::Io { path, source }
        }
    }

    /// Returns true when the error only means "no such fixture".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use std::io;

    #[test]
    fn not_found_kind_maps_to_not_found() {
        let err = StoreError::from_io("a/b.json", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("a/b.json"));
    }

    #[test]
    fn other_kinds_stay_io() {
        let err = StoreError::from_io(
            "a/b.json",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
