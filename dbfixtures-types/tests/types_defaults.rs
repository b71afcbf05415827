use camino::Utf8PathBuf;
use dbfixtures_types::{
    CollectSummary, CollectedFixture, Flavour, ServerIdentity, ToolInfo, Version,
};
use pretty_assertions::assert_eq;

fn tool() -> ToolInfo {
    ToolInfo {
        name: "dbfixtures".to_string(),
        version: Some("1.2.3".to_string()),
    }
}

#[test]
fn collect_summary_new_sets_schema_and_defaults() {
    let identity = ServerIdentity::new(Flavour::PerconaServerForMongoDb, "3.4.13-1.2");
    let summary = CollectSummary::new(tool(), identity.clone(), Utf8PathBuf::from("versions"));

    assert_eq!(summary.schema, dbfixtures_types::schema::DBFIXTURES_COLLECT_V1);
    assert_eq!(summary.identity, identity);
    assert_eq!(summary.identity.version, Version::normalize("3.4.13"));
    assert!(summary.ended_at.is_none());
    assert!(summary.fixtures.is_empty());
    assert_eq!(summary.total_bytes(), 0);
}

#[test]
fn total_bytes_sums_fixture_sizes() {
    let mut summary = CollectSummary::new(
        tool(),
        ServerIdentity::new(Flavour::MongoDb, "4.0.0"),
        Utf8PathBuf::from("versions"),
    );
    for (command, bytes) in [("hostInfo", 10), ("top", 32)] {
        summary.fixtures.push(CollectedFixture {
            command: command.to_string(),
            path: Utf8PathBuf::from(format!("versions/mongodb/4.0.0/{command}.json")),
            bytes,
        });
    }
    assert_eq!(summary.total_bytes(), 42);
}

#[test]
fn every_flavour_round_trips_through_its_tag() {
    for flavour in Flavour::ALL {
        let parsed: Flavour = flavour.as_str().parse().expect("parse tag");
        assert_eq!(parsed, flavour);
    }
}
