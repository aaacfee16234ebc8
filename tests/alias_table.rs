use std::collections::BTreeSet;

use shortform_core::registry::{AliasError, AliasTable};
use shortform_core::types::Shortform;
use tempfile::tempdir;

fn sf(s: &str) -> Shortform {
    Shortform::new(s).unwrap()
}

#[test]
fn aliases_route_to_one_canonical_key() {
    let table = AliasTable::from_pairs([
        (sf("ER"), sf("ER")),
        (sf("Er"), sf("ER")),
        (sf("ERs"), sf("ER")),
        (sf("PCR"), sf("PCR")),
    ])
    .unwrap();

    assert_eq!(table.resolve("Er"), Some(&sf("ER")));
    assert_eq!(table.resolve("ERs"), Some(&sf("ER")));
    assert_eq!(table.resolve("PCR"), Some(&sf("PCR")));
    assert_eq!(table.resolve("TNF"), None);
    let keys: Vec<&str> = table.canonical_keys().into_iter().map(Shortform::as_str).collect();
    assert_eq!(keys, vec!["ER", "PCR"]);
    assert_eq!(
        table.aliases_of("ER"),
        BTreeSet::from([sf("ER"), sf("ERs"), sf("Er")])
    );
}

#[test]
fn conflicting_alias_is_rejected() {
    let err = AliasTable::from_pairs([(sf("ER"), sf("ER")), (sf("ER"), sf("ESR1"))]).unwrap_err();
    match err {
        AliasError::ConflictingAlias { alias, first, second } => {
            assert_eq!(alias, sf("ER"));
            assert_eq!(first, sf("ER"));
            assert_eq!(second, sf("ESR1"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn longer_cycles_are_rejected() {
    let err = AliasTable::from_pairs([(sf("A"), sf("B")), (sf("B"), sf("C")), (sf("C"), sf("A"))])
        .unwrap_err();
    assert!(matches!(err, AliasError::Cycle { .. }));
    assert!(err.to_string().contains("A -> B -> C -> A"));
}

#[test]
fn json_table_fails_fast_on_conflict() {
    let json = r#"[
        {"alias": "Er", "canonical": "ER"},
        {"alias": "Er", "canonical": "EMR"}
    ]"#;
    assert!(matches!(
        AliasTable::from_json_str(json),
        Err(AliasError::ConflictingAlias { .. })
    ));

    let invalid_key = r#"[{"alias": "E R", "canonical": "ER"}]"#;
    assert!(matches!(
        AliasTable::from_json_str(invalid_key),
        Err(AliasError::Parse(_))
    ));
}

#[test]
fn serialized_table_reloads_identically() {
    let table = AliasTable::from_pairs([(sf("Er"), sf("ER")), (sf("IL6"), sf("IL-6"))]).unwrap();
    let json = serde_json::to_string(&table).unwrap();
    let reloaded: AliasTable = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, table);

    let dir = tempdir().unwrap();
    let path = dir.path().join("aliases.json");
    std::fs::write(&path, &json).unwrap();
    assert_eq!(AliasTable::from_path(&path).unwrap(), table);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = AliasTable::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, AliasError::Io(_)));
}

#[test]
fn identity_table_routes_each_key_to_itself() {
    let table = AliasTable::identity([sf("ER"), sf("PCR")]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.resolve("ER"), Some(&sf("ER")));
    assert!(!table.contains("Er"));
}

#[test]
fn alias_errors_are_configuration_errors() {
    let err: shortform_core::Error = AliasTable::from_pairs([(sf("A"), sf("A")), (sf("A"), sf("B"))])
        .unwrap_err()
        .into();
    assert!(err.is_configuration());
    assert!(!err.is_unknown_shortform());
}
