//! Property-based tests for store round-trips.

use camino::Utf8PathBuf;
use dbfixtures_store::FixtureStore;
use dbfixtures_types::{Flavour, ServerIdentity};
use proptest::prelude::*;
use tempfile::TempDir;

fn arb_flavour() -> impl Strategy<Value = Flavour> {
    prop::sample::select(Flavour::ALL.to_vec())
}

fn arb_version() -> impl Strategy<Value = String> {
    (0u32..8, 0u32..20, 0u32..40, prop::option::of("[a-z0-9]{1,4}")).prop_map(
        |(major, minor, patch, suffix)| match suffix {
            Some(s) => format!("{major}.{minor}.{patch}-{s}"),
            None => format!("{major}.{minor}.{patch}"),
        },
    )
}

proptest! {
    /// Any non-empty payload loads back byte-for-byte.
    #[test]
    fn write_then_load_is_byte_exact(
        flavour in arb_flavour(),
        raw_version in arb_version(),
        command in "[a-zA-Z][a-zA-Z0-9_]{0,15}",
        payload in prop::collection::vec(any::<u8>(), 1..512),
    ) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let store = FixtureStore::new(root);
        let identity = ServerIdentity::new(flavour, raw_version.as_str());

        store.write(&identity, &command, &payload).unwrap();
        let loaded = store.load(flavour, &identity.version, &command).unwrap();

        prop_assert_eq!(loaded, payload);
        prop_assert_eq!(store.versions(flavour).unwrap(), vec![identity.version.clone()]);
    }
}
