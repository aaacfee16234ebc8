use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::document::text::normalize;
use crate::types::identifiers::{GroundingId, Shortform};

/// One real-world sense of a shortform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grounding {
    pub id: GroundingId,
    /// Human-readable canonical longform, e.g. "Estrogen Receptor".
    pub name: String,
    /// Normalized longform texts mapped onto this sense.
    pub longforms: BTreeSet<String>,
}

impl Grounding {
    /// Longforms are normalized on the way in; empty ones are discarded.
    pub fn new<I, S>(id: GroundingId, name: impl Into<String>, longforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let longforms = longforms
            .into_iter()
            .map(|l| normalize(l.as_ref()))
            .filter(|l| !l.is_empty())
            .collect();
        Grounding {
            id,
            name: name.into(),
            longforms,
        }
    }
}

/// A mined longform with its aggregated support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingEntry {
    /// Normalized longform text.
    pub longform: String,
    pub frequency: usize,
    /// Raw surface spans that normalized to `longform`.
    pub variants: BTreeSet<String>,
}

/// Frequency desc, then longer (more specific) text, then lexicographic.
pub fn entry_order(a: &GroundingEntry, b: &GroundingEntry) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| b.longform.len().cmp(&a.longform.len()))
        .then_with(|| a.longform.cmp(&b.longform))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundedCount {
    pub grounding: Grounding,
    pub frequency: usize,
}

fn grounded_order(a: &GroundedCount, b: &GroundedCount) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| b.grounding.name.len().cmp(&a.grounding.name.len()))
        .then_with(|| a.grounding.id.cmp(&b.grounding.id))
}

/// Shortform → groundings ordered by frequency.
///
/// Built from miner output, optionally curated onto stable grounding ids,
/// then frozen and handed to training.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundingMap {
    entries: BTreeMap<Shortform, Vec<GroundedCount>>,
}

impl GroundingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// One provisional grounding per mined longform, keyed by the longform
    /// text itself.
    pub fn from_mined(mined: &BTreeMap<Shortform, Vec<GroundingEntry>>) -> Self {
        let mut map = GroundingMap::new();
        for (shortform, entries) in mined {
            map.insert_mined(shortform.clone(), entries);
        }
        map
    }

    pub fn insert_mined(&mut self, shortform: Shortform, entries: &[GroundingEntry]) {
        let mut counts: Vec<GroundedCount> = entries
            .iter()
            .filter_map(|entry| {
                let id = GroundingId::new(entry.longform.clone()).ok()?;
                Some(GroundedCount {
                    grounding: Grounding {
                        id,
                        name: entry.longform.clone(),
                        longforms: BTreeSet::from([entry.longform.clone()]),
                    },
                    frequency: entry.frequency,
                })
            })
            .collect();
        counts.sort_by(grounded_order);
        self.entries.insert(shortform, counts);
    }

    /// Re-key a shortform's longforms onto curated groundings.
    ///
    /// Frequencies of every longform assigned to the same grounding add up.
    /// Longforms no curated grounding claims are dropped; curated groundings
    /// with no mined support are kept with frequency 0.
    pub fn curate(&mut self, shortform: &Shortform, groundings: &[Grounding]) {
        let mined: BTreeMap<String, usize> = self
            .entries
            .get(shortform)
            .map(|counts| {
                counts
                    .iter()
                    .flat_map(|c| c.grounding.longforms.iter().map(move |l| (l.clone(), c.frequency)))
                    .collect()
            })
            .unwrap_or_default();

        let mut counts: Vec<GroundedCount> = groundings
            .iter()
            .map(|g| GroundedCount {
                frequency: g.longforms.iter().filter_map(|l| mined.get(l)).sum(),
                grounding: g.clone(),
            })
            .collect();
        counts.sort_by(grounded_order);
        self.entries.insert(shortform.clone(), counts);
    }

    pub fn get(&self, shortform: &str) -> Option<&[GroundedCount]> {
        self.entries.get(shortform).map(Vec::as_slice)
    }

    pub fn top_k(&self, shortform: &str, k: usize) -> Vec<&GroundedCount> {
        self.get(shortform)
            .map(|counts| counts.iter().take(k).collect())
            .unwrap_or_default()
    }

    /// Normalized longform → grounding id for one shortform.
    pub fn longform_index(&self, shortform: &str) -> BTreeMap<String, GroundingId> {
        self.get(shortform)
            .into_iter()
            .flatten()
            .flat_map(|c| {
                c.grounding
                    .longforms
                    .iter()
                    .map(move |l| (l.clone(), c.grounding.id.clone()))
            })
            .collect()
    }

    /// Grounding id → canonical longform for one shortform.
    pub fn names(&self, shortform: &str) -> BTreeMap<GroundingId, String> {
        self.get(shortform)
            .into_iter()
            .flatten()
            .map(|c| (c.grounding.id.clone(), c.grounding.name.clone()))
            .collect()
    }

    pub fn shortforms(&self) -> impl Iterator<Item = &Shortform> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
