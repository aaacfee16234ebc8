use shortform_core::config::{Config, MinerConfig, TrainingConfig};
use shortform_core::document::{tokenize, Document, DocumentId};
use shortform_core::mining::LongformMiner;
use shortform_core::registry::{ModelStore, ModelStoreBuilder};
use shortform_core::types::{GroundingId, Shortform, TrainingExample};
use shortform_core::{train_disambiguator, AliasTable};
use tempfile::tempdir;

fn sf(s: &str) -> Shortform {
    Shortform::new(s).unwrap()
}

fn make_examples() -> Vec<TrainingExample> {
    let senses = [
        ("HGNC:3467", ["estradiol", "breast", "tamoxifen", "ligand", "hormone"]),
        ("GO:0005783", ["lumen", "chaperone", "folding", "calcium", "stress"]),
        ("MESH:D004636", ["triage", "admission", "trauma", "waiting", "nurse"]),
    ];
    let mut examples = Vec::new();
    for (label, words) in senses {
        for i in 0..7 {
            let text = format!("ER {} near {} with {}", words[i % 5], words[(i + 2) % 5], words[(i + 4) % 5]);
            examples.push(TrainingExample::new(
                sf("ER"),
                tokenize(&text),
                GroundingId::new(label).unwrap(),
            ));
        }
    }
    examples
}

#[test]
fn training_twice_gives_identical_artifacts() {
    let aliases = AliasTable::identity([sf("ER")]);
    let config = TrainingConfig::v0();
    let a = train_disambiguator(&sf("ER"), &make_examples(), &aliases, &config).unwrap();
    let b = train_disambiguator(&sf("ER"), &make_examples(), &aliases, &config).unwrap();

    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn seed_changes_only_the_fold_assignment() {
    let aliases = AliasTable::identity([sf("ER")]);
    let seeded = TrainingConfig {
        seed: 7,
        ..TrainingConfig::v0()
    };
    let model = train_disambiguator(&sf("ER"), &make_examples(), &aliases, &seeded).unwrap();
    assert_eq!(model.groundings().len(), 3);
    assert_eq!(model.stats().folds, 5);
    assert!(seeded.regularization_grid.contains(&model.stats().regularization));
}

#[test]
fn store_version_ignores_build_time() {
    let aliases = AliasTable::identity([sf("ER")]);
    let model =
        train_disambiguator(&sf("ER"), &make_examples(), &aliases, &TrainingConfig::v0()).unwrap();

    let dir = tempdir().unwrap();
    let first = ModelStoreBuilder::new(Config::default())
        .build(vec![model.clone()], &aliases, &dir.path().join("one"))
        .unwrap();
    let second = ModelStoreBuilder::new(Config::default())
        .build(vec![model], &aliases, &dir.path().join("two"))
        .unwrap();

    assert_eq!(first.manifest.store_version, second.manifest.store_version);
    assert_eq!(first.manifest.models, second.manifest.models);
    let reopened = ModelStore::open(&dir.path().join("two")).unwrap();
    assert_eq!(reopened.manifest.models, first.manifest.models);
}

#[test]
fn document_versions_depend_only_on_tokens() {
    let a = Document::from_text(DocumentId::new("a"), "Estrogen receptor (ER) binds.");
    let b = Document::from_text(DocumentId::new("b"), "Estrogen   receptor ( ER ) binds .");
    assert_eq!(a.tokens, b.tokens);
    assert_eq!(a.version, b.version);
}

#[test]
fn mining_is_order_independent() {
    let texts = [
        "the estrogen receptor (ER) was bound",
        "in the endoplasmic reticulum (ER) lumen",
        "an Estrogen Receptor (ER) agonist",
    ];
    let docs: Vec<Document> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Document::from_text(DocumentId::new(format!("d{i}")), t))
        .collect();
    let reversed: Vec<Document> = docs.iter().rev().cloned().collect();

    let mut forward = LongformMiner::new([sf("ER")], MinerConfig::v0());
    forward.process_all(&docs);
    let mut backward = LongformMiner::new([sf("ER")], MinerConfig::v0());
    backward.process_all(&reversed);

    assert_eq!(forward, backward);
    assert_eq!(forward.top("ER"), backward.top("ER"));
    assert_eq!(forward.top("ER")[0].longform, "estrogen receptor");
}
