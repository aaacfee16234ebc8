use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::text::find_occurrences;
use crate::types::identifiers::GroundingId;

/// Outcome of disambiguating one occurrence.
///
/// `grounding` is [`GroundingId::ungrounded`] when the top probability is
/// below the threshold; `confidence` and `distribution` are filled in
/// either way so the caller can re-threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub grounding: GroundingId,
    /// Probability of the most likely grounding.
    pub confidence: f64,
    pub distribution: BTreeMap<GroundingId, f64>,
}

impl Prediction {
    /// Ties between equally likely groundings go to the smaller id.
    pub fn from_distribution(distribution: BTreeMap<GroundingId, f64>, threshold: f64) -> Self {
        let best = distribution
            .iter()
            .fold(None::<(&GroundingId, f64)>, |best, (id, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((id, p)),
            });

        let (grounding, confidence) = match best {
            Some((id, p)) if p >= threshold => (id.clone(), p),
            Some((_, p)) => (GroundingId::ungrounded(), p),
            None => (GroundingId::ungrounded(), 0.0),
        };
        Prediction {
            grounding,
            confidence,
            distribution,
        }
    }

    /// The same distribution judged against another threshold.
    pub fn rethreshold(&self, threshold: f64) -> Self {
        Self::from_distribution(self.distribution.clone(), threshold)
    }

    pub fn is_grounded(&self) -> bool {
        !self.grounding.is_ungrounded()
    }

    pub fn probability(&self, grounding: &str) -> f64 {
        self.distribution.get(grounding).copied().unwrap_or(0.0)
    }
}

/// A tokenized text and the offsets of the shortform occurrences in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrences<'a> {
    pub tokens: &'a [String],
    pub offsets: Vec<usize>,
}

impl<'a> Occurrences<'a> {
    pub fn new(tokens: &'a [String], offsets: Vec<usize>) -> Self {
        Self { tokens, offsets }
    }

    /// Every token equal to `shortform`.
    pub fn find(tokens: &'a [String], shortform: &str) -> Self {
        Self {
            tokens,
            offsets: find_occurrences(tokens, shortform),
        }
    }
}
