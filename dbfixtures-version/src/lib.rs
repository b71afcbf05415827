//! Version ordering and constraint matching for stored fixture versions.
//!
//! Constraints look like `> 3.4`, `= 2.6.12`, `!= 2` or `>= 3.0, < 3.6`. Missing
//! version segments are zero, so `> 3` means "greater than 3.0.0".
//!
//! [`matches`] is meant to be used as a filter predicate: a malformed
//! constraint or version never matches instead of returning an error. Use
//! [`Constraint::parse`] and [`SemVer::parse`] directly when the error matters.

mod constraint;
mod error;
mod semver;

pub use constraint::{Clause, Constraint, Op};
pub use error::{ConstraintError, VersionParseError};
pub use semver::SemVer;

use std::cmp::Ordering;

/// Tests `version` against `constraint`. Parse failures on either side yield `false`.
pub fn matches(version: &str, constraint: &str) -> bool {
    let Ok(constraint) = Constraint::parse(constraint) else {
        return false;
    };
    let Ok(version) = SemVer::parse(version) else {
        return false;
    };
    constraint.check(&version)
}

/// Sorts version strings ascending by semver order.
///
/// Unparsable strings go last, in lexical order. Versions that compare equal
/// (`3` and `3.0.0`) fall back to lexical order so the result is total.
pub fn sort_versions<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| compare_version_strs(a.as_ref(), b.as_ref()));
}

fn compare_version_strs(a: &str, b: &str) -> Ordering {
    match (SemVer::parse(a), SemVer::parse(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
