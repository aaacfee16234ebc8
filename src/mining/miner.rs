use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::MinerConfig;
use crate::document::text::{candidate_window_start, defining_pattern_offsets};
use crate::document::Document;
use crate::types::grounding::GroundingEntry;
use crate::types::identifiers::Shortform;

use super::alignment::align;
use super::tree::CandidateTree;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurrenceStats {
    /// Defining patterns seen.
    pub occurrences: usize,
    /// Defining patterns whose preceding window aligned to the shortform.
    pub aligned: usize,
}

impl OccurrenceStats {
    fn add(&mut self, other: OccurrenceStats) {
        self.occurrences += other.occurrences;
        self.aligned += other.aligned;
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ShortformState {
    letters: Vec<char>,
    tree: CandidateTree,
    stats: OccurrenceStats,
}

impl ShortformState {
    fn new(shortform: &Shortform) -> Self {
        Self {
            letters: shortform.letters(),
            tree: CandidateTree::new(),
            stats: OccurrenceStats::default(),
        }
    }
}

/// Incremental longform miner over a fixed set of shortforms.
///
/// Documents can be fed one at a time with [`LongformMiner::process`], or
/// scanned in parallel with [`LongformMiner::mine_parallel`]; two miners
/// merge by adding node counts, so the result never depends on how the
/// corpus was split.
#[derive(Debug, Clone, PartialEq)]
pub struct LongformMiner {
    config: MinerConfig,
    state: BTreeMap<Shortform, ShortformState>,
}

impl LongformMiner {
    pub fn new<I>(shortforms: I, config: MinerConfig) -> Self
    where
        I: IntoIterator<Item = Shortform>,
    {
        let state = shortforms
            .into_iter()
            .map(|sf| {
                let st = ShortformState::new(&sf);
                (sf, st)
            })
            .collect();
        Self { config, state }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Scan one document for `longform ( SF )` patterns of every tracked
    /// shortform and record the aligned candidates.
    pub fn process(&mut self, document: &Document) {
        let config = &self.config;
        for (shortform, st) in self.state.iter_mut() {
            let max_words = config.window_len(shortform.surface_len());
            for offset in defining_pattern_offsets(&document.tokens, shortform.as_str()) {
                st.stats.occurrences += 1;
                let paren = offset - 1;
                let start = candidate_window_start(&document.tokens, paren, max_words);
                let window = &document.tokens[start..paren];
                match align(&st.letters, window) {
                    Some(first) => {
                        st.stats.aligned += 1;
                        st.tree.insert(&window[first..]);
                    }
                    None => {
                        trace!(
                            shortform = shortform.as_str(),
                            document = document.id.as_str(),
                            offset,
                            "no alignment for defining pattern"
                        );
                    }
                }
            }
        }
    }

    pub fn process_all<'a, I>(&mut self, documents: I)
    where
        I: IntoIterator<Item = &'a Document>,
    {
        for document in documents {
            self.process(document);
        }
    }

    /// Scan documents on the rayon pool and reduce the per-worker miners
    /// with [`LongformMiner::merge`].
    pub fn mine_parallel(
        shortforms: &[Shortform],
        documents: &[Document],
        config: &MinerConfig,
    ) -> Self {
        let empty = || LongformMiner::new(shortforms.iter().cloned(), config.clone());
        let miner = documents
            .par_iter()
            .fold(empty, |mut miner, doc| {
                miner.process(doc);
                miner
            })
            .reduce(empty, |mut a, b| {
                a.merge(&b);
                a
            });
        debug!(
            documents = documents.len(),
            shortforms = shortforms.len(),
            "mined corpus"
        );
        miner
    }

    /// Add another miner's counts into this one. Shortforms only `other`
    /// tracks are adopted.
    pub fn merge(&mut self, other: &LongformMiner) {
        for (shortform, theirs) in &other.state {
            let ours = self
                .state
                .entry(shortform.clone())
                .or_insert_with(|| ShortformState::new(shortform));
            ours.tree.merge(&theirs.tree);
            ours.stats.add(theirs.stats);
        }
    }

    pub fn tree(&self, shortform: &str) -> Option<&CandidateTree> {
        self.state.get(shortform).map(|st| &st.tree)
    }

    pub fn stats(&self, shortform: &str) -> Option<OccurrenceStats> {
        self.state.get(shortform).map(|st| st.stats)
    }

    /// Ranked canonical longforms for one shortform; empty when nothing
    /// aligned or the shortform is not tracked.
    pub fn top(&self, shortform: &str) -> Vec<GroundingEntry> {
        let Some(st) = self.state.get(shortform) else {
            return Vec::new();
        };
        let entries = st
            .tree
            .select(self.config.min_support, self.config.specialization_ratio);
        debug!(
            shortform,
            occurrences = st.stats.occurrences,
            aligned = st.stats.aligned,
            selected = entries.len(),
            "selected longforms"
        );
        entries
    }

    /// [`LongformMiner::top`] for every tracked shortform.
    pub fn grounding_entries(&self) -> BTreeMap<Shortform, Vec<GroundingEntry>> {
        self.state
            .keys()
            .map(|sf| (sf.clone(), self.top(sf.as_str())))
            .collect()
    }
}

/// Mine ranked longform candidates for a single shortform.
pub fn mine_longforms(
    documents: &[Document],
    shortform: &Shortform,
    config: &MinerConfig,
) -> Vec<GroundingEntry> {
    LongformMiner::mine_parallel(std::slice::from_ref(shortform), documents, config)
        .top(shortform.as_str())
}
