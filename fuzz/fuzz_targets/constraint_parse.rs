#![no_main]

//! Fuzz target for constraint parsing and `matches`.
//!
//! The input is split into a version and a constraint; `matches` must agree
//! with parsing both sides by hand and must never panic.

use arbitrary::Arbitrary;
use dbfixtures_version::{Constraint, SemVer, matches};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    version: &'a str,
    constraint: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let expected = match (
        SemVer::parse(input.version),
        Constraint::parse(input.constraint),
    ) {
        (Ok(version), Ok(constraint)) => constraint.check(&version),
        _ => false,
    };
    assert_eq!(matches(input.version, input.constraint), expected);

    if let Ok(constraint) = Constraint::parse(input.constraint) {
        let _ = constraint.to_string();
    }
});
