use std::collections::{BTreeMap, BTreeSet};

use shortform_core::types::{Grounding, GroundingEntry, GroundingId, GroundingMap, Shortform};

fn sf(s: &str) -> Shortform {
    Shortform::new(s).unwrap()
}

fn gid(s: &str) -> GroundingId {
    GroundingId::new(s).unwrap()
}

fn entry(longform: &str, frequency: usize) -> GroundingEntry {
    GroundingEntry {
        longform: longform.to_string(),
        frequency,
        variants: BTreeSet::from([longform.to_string()]),
    }
}

fn mined() -> GroundingMap {
    let mined = BTreeMap::from([(
        sf("ER"),
        vec![
            entry("estrogen receptor", 12),
            entry("oestrogen receptor", 3),
            entry("endoplasmic reticulum", 9),
            entry("emergency room", 1),
        ],
    )]);
    GroundingMap::from_mined(&mined)
}

#[test]
fn mined_map_orders_by_frequency() {
    let map = mined();
    let top: Vec<&str> = map
        .top_k("ER", 2)
        .iter()
        .map(|c| c.grounding.id.as_str())
        .collect();
    assert_eq!(top, vec!["estrogen receptor", "endoplasmic reticulum"]);
    assert_eq!(map.get("ER").unwrap().len(), 4);
    assert!(map.get("PCR").is_none());
    assert!(map.top_k("PCR", 3).is_empty());
}

#[test]
fn curation_sums_longforms_of_one_grounding() {
    let mut map = mined();
    let curated = [
        Grounding::new(
            gid("HGNC:3467"),
            "Estrogen Receptor",
            ["Estrogen Receptor", "oestrogen-receptor"],
        ),
        Grounding::new(gid("GO:0005783"), "Endoplasmic Reticulum", ["endoplasmic reticulum"]),
    ];
    map.curate(&sf("ER"), &curated);

    let counts = map.get("ER").unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].grounding.id, gid("HGNC:3467"));
    assert_eq!(counts[0].frequency, 15);
    assert_eq!(counts[1].frequency, 9);

    // Unclaimed longforms no longer route anywhere.
    let index = map.longform_index("ER");
    assert_eq!(index.get("oestrogen receptor"), Some(&gid("HGNC:3467")));
    assert!(!index.contains_key("emergency room"));

    assert_eq!(
        map.names("ER").get(&gid("GO:0005783")).map(String::as_str),
        Some("Endoplasmic Reticulum")
    );
}

#[test]
fn curated_grounding_without_support_is_kept_at_zero() {
    let mut map = mined();
    map.curate(
        &sf("ER"),
        &[Grounding::new(gid("MESH:D004636"), "Emergency Room", ["emergency ward"])],
    );
    let counts = map.get("ER").unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].frequency, 0);
}

#[test]
fn map_round_trips_through_json() {
    let map = mined();
    let json = serde_json::to_string(&map).unwrap();
    let back: GroundingMap = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
    assert_eq!(back.shortforms().collect::<Vec<_>>(), vec![&sf("ER")]);
}
