#![no_main]

//! Fuzz target for version parsing and ordering.
//!
//! Parsing arbitrary text must never panic, and anything that parses must
//! print back to a string that parses to an equal version.

use dbfixtures_version::SemVer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(version) = SemVer::parse(s) else {
        return;
    };

    let printed = version.to_string();
    let reparsed = SemVer::parse(&printed).expect("displayed version must parse");
    assert_eq!(version, reparsed);
    assert_eq!(version.cmp(&reparsed), std::cmp::Ordering::Equal);

    // Zero padding must not change ordering.
    let padded = SemVer::parse(&format!("{}.0", s.trim()));
    if let Ok(padded) = padded
        && !version.is_prerelease()
        && version.metadata().is_none()
    {
        assert_eq!(version, padded);
    }
});
