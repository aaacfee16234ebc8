use proptest::prelude::*;
use shortform_core::config::MinerConfig;
use shortform_core::document::{normalize, Document, DocumentId};
use shortform_core::mining::{mine_longforms, LongformMiner};
use shortform_core::types::Shortform;

const SENTENCES: &[&str] = &[
    "In breast cancer the Estrogen Receptor (ER) is overexpressed.",
    "Binding of estradiol to the estrogen receptor (ER) activates transcription.",
    "Misfolded proteins accumulate in the endoplasmic reticulum (ER) under stress.",
    "Calcium release from the Endoplasmic Reticulum (ER) was measured.",
    "Patients arriving at the emergency room (ER) were triaged.",
    "The ER was not defined here.",
    "Expression of ER (estrogen receptor) was low.",
    "Serum interleukin 6 (IL-6) increased after surgery.",
    "Levels of interleukin-6 (IL-6) were high.",
    "Samples were analyzed by polymerase chain reaction (PCR).",
    "Real-time polymerase chain reaction (PCR) confirmed the result.",
    "A reverse transcription polymerase chain reaction (PCR) assay was used.",
];

fn make_doc(id: &str, text: &str) -> Document {
    Document::from_text(DocumentId::new(id), text)
}

fn corpus(indices: &[usize]) -> Vec<Document> {
    indices
        .iter()
        .enumerate()
        .map(|(n, &i)| make_doc(&format!("doc-{n}"), SENTENCES[i]))
        .collect()
}

fn sf(s: &str) -> Shortform {
    Shortform::new(s).unwrap()
}

fn shortforms() -> Vec<Shortform> {
    vec![sf("ER"), sf("IL-6"), sf("PCR")]
}

#[test]
fn estrogen_receptor_is_recovered() {
    let docs = vec![make_doc("a", "...the Estrogen Receptor (ER) is...")];
    let entries = mine_longforms(&docs, &sf("ER"), &MinerConfig::v0());

    let er = entries
        .iter()
        .find(|e| e.longform == "estrogen receptor")
        .expect("estrogen receptor must be mined");
    assert!(er.frequency >= 1);
    assert!(er.variants.contains("Estrogen Receptor"));
}

#[test]
fn unalignable_occurrence_yields_no_candidates() {
    let docs = vec![
        make_doc("a", "Patients were seen quickly (ER) today."),
        make_doc("b", "The ER was not defined here."),
    ];
    let mut miner = LongformMiner::new([sf("ER")], MinerConfig::v0());
    miner.process_all(&docs);

    assert!(miner.top("ER").is_empty());
    assert!(miner.tree("ER").unwrap().is_empty());
    let stats = miner.stats("ER").unwrap();
    assert_eq!(stats.occurrences, 1);
    assert_eq!(stats.aligned, 0);
}

#[test]
fn untracked_shortform_yields_empty_entry() {
    let miner = LongformMiner::new([sf("ER")], MinerConfig::v0());
    assert!(miner.top("TNF").is_empty());
    assert!(miner.stats("TNF").is_none());
}

#[test]
fn distinct_senses_are_ranked_by_frequency() {
    let docs = corpus(&[0, 1, 2, 3, 4, 6]);
    let entries = mine_longforms(&docs, &sf("ER"), &MinerConfig::v0());
    let texts: Vec<&str> = entries.iter().map(|e| e.longform.as_str()).collect();

    assert_eq!(
        texts,
        vec!["endoplasmic reticulum", "estrogen receptor", "emergency room"]
    );
    assert_eq!(entries[0].frequency, 2);
    assert_eq!(entries[1].frequency, 2);
    assert_eq!(entries[2].frequency, 1);
}

#[test]
fn hyphenated_and_digit_shortforms_align() {
    let docs = corpus(&[7, 8]);
    let entries = mine_longforms(&docs, &sf("IL-6"), &MinerConfig::v0());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].longform, "interleukin 6");
    assert_eq!(entries[0].frequency, 2);
    assert!(entries[0].variants.contains("interleukin-6"));
}

#[test]
fn modifiers_before_the_longform_are_not_included() {
    let docs = corpus(&[9, 10, 11]);
    let entries = mine_longforms(&docs, &sf("PCR"), &MinerConfig::v0());
    assert_eq!(entries[0].longform, "polymerase chain reaction");
    assert_eq!(entries[0].frequency, 3);
}

#[test]
fn min_support_prunes_rare_candidates() {
    let docs = corpus(&[0, 1, 4]);
    let config = MinerConfig {
        min_support: 2,
        ..MinerConfig::v0()
    };
    let entries = mine_longforms(&docs, &sf("ER"), &config);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].longform, "estrogen receptor");
}

#[test]
fn parallel_and_serial_mining_agree() {
    let docs = corpus(&(0..SENTENCES.len()).collect::<Vec<_>>());
    let parallel = LongformMiner::mine_parallel(&shortforms(), &docs, &MinerConfig::v0());
    let mut serial = LongformMiner::new(shortforms(), MinerConfig::v0());
    serial.process_all(&docs);

    assert_eq!(parallel, serial);
    assert_eq!(parallel.grounding_entries(), serial.grounding_entries());
}

proptest! {
    #[test]
    fn normalization_is_idempotent(text in "[a-zA-Z0-9 ,.;()\\-_'ÉéΣσς]{0,40}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn mining_a_union_equals_merging_the_parts(
        left in prop::collection::vec(0..SENTENCES.len(), 0..10),
        right in prop::collection::vec(0..SENTENCES.len(), 0..10),
    ) {
        let config = MinerConfig::v0();
        let mut union_indices = left.clone();
        union_indices.extend(&right);

        let mut whole = LongformMiner::new(shortforms(), config.clone());
        whole.process_all(&corpus(&union_indices));

        let mut a = LongformMiner::new(shortforms(), config.clone());
        a.process_all(&corpus(&left));
        let mut b = LongformMiner::new(shortforms(), config.clone());
        b.process_all(&corpus(&right));

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&a);

        prop_assert_eq!(&ab, &whole);
        prop_assert_eq!(&ba, &whole);
        prop_assert_eq!(ab.grounding_entries(), whole.grounding_entries());
    }
}
