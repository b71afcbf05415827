use crate::error::VersionParseError;
use semver::{BuildMetadata, Prerelease};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed version: numeric core segments plus optional pre-release.
///
/// Core segments are compared positionally with missing segments treated as
/// zero, so `3`, `3.0` and `3.0.0` are equal. Pre-release and build metadata
/// follow SemVer 2.0 rules; metadata is kept for display but never takes part
/// in comparisons.
#[derive(Debug, Clone)]
pub struct SemVer {
    segments: Vec<u64>,
    pre: Prerelease,
    build: BuildMetadata,
}

impl SemVer {
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        if body.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let (body, build) = match body.split_once('+') {
            Some((rest, meta)) => {
                let invalid = |reason: String| VersionParseError::InvalidMetadata {
                    input: input.to_string(),
                    reason,
                };
                if meta.is_empty() {
                    return Err(invalid("empty build metadata".to_string()));
                }
                let build = BuildMetadata::new(meta).map_err(|e| invalid(e.to_string()))?;
                (rest, build)
            }
            None => (body, BuildMetadata::EMPTY),
        };

        let (core, pre) = match body.split_once('-') {
            Some((core, pre)) => {
                let invalid = |reason: String| VersionParseError::InvalidPrerelease {
                    input: input.to_string(),
                    reason,
                };
                if pre.is_empty() {
                    return Err(invalid("empty pre-release".to_string()));
                }
                let pre = Prerelease::new(pre).map_err(|e| invalid(e.to_string()))?;
                (core, pre)
            }
            None => (body, Prerelease::EMPTY),
        };

        let segments = core
            .split('.')
            .map(|segment| parse_segment(input, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            segments,
            pre,
            build,
        })
    }

    /// Segment `idx` (0 = major), zero when absent.
    pub fn segment(&self, idx: usize) -> u64 {
        self.segments.get(idx).copied().unwrap_or(0)
    }

    pub fn major(&self) -> u64 {
        self.segment(0)
    }

    pub fn minor(&self) -> u64 {
        self.segment(1)
    }

    pub fn patch(&self) -> u64 {
        self.segment(2)
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    pub fn prerelease(&self) -> &Prerelease {
        &self.pre
    }

    pub fn metadata(&self) -> Option<&str> {
        (!self.build.is_empty()).then(|| self.build.as_str())
    }

    /// Whether both versions have the same numeric core, ignoring pre-release.
    pub fn same_core(&self, other: &SemVer) -> bool {
        self.cmp_core(other) == Ordering::Equal
    }

    fn cmp_core(&self, other: &SemVer) -> Ordering {
        let width = self.segments.len().max(other.segments.len());
        (0..width)
            .map(|idx| self.segment(idx).cmp(&other.segment(idx)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

fn parse_segment(input: &str, segment: &str) -> Result<u64, VersionParseError> {
    let invalid = || VersionParseError::InvalidSegment {
        input: input.to_string(),
        segment: segment.to_string(),
    };
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    segment.parse::<u64>().map_err(|_| invalid())
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        // `Prerelease` orders the empty (release) value above any pre-release.
        self.cmp_core(other).then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemVer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemVer {}

impl FromStr for SemVer {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemVer::parse(s)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self
            .segments
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&core)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}
