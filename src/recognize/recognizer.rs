use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::config::MinerConfig;
use crate::document::text::{candidate_window_start, defining_pattern_offsets};
use crate::types::identifiers::{GroundingId, Shortform};

use super::trie::SearchTrie;

/// A defining pattern whose longform is a known grounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Offset of the shortform token.
    pub offset: usize,
    /// Raw tokens of the recognized longform.
    pub span: Range<usize>,
    pub longform: String,
    pub grounding: GroundingId,
}

/// Finds `longform ( SF )` patterns whose longform is in a grounding map.
#[derive(Debug, Clone)]
pub struct Recognizer {
    shortform: Shortform,
    trie: SearchTrie,
    window: usize,
}

impl Recognizer {
    /// `longforms` maps normalized longform text to its grounding, as
    /// produced by `GroundingMap::longform_index`. The candidate window is
    /// sized like the miner's.
    pub fn new(
        shortform: Shortform,
        longforms: &BTreeMap<String, GroundingId>,
        config: &MinerConfig,
    ) -> Self {
        let window = config.window_len(shortform.surface_len());
        Self {
            trie: SearchTrie::new(longforms),
            shortform,
            window,
        }
    }

    pub fn shortform(&self) -> &Shortform {
        &self.shortform
    }

    pub fn recognize(&self, tokens: &[String]) -> Vec<Recognition> {
        defining_pattern_offsets(tokens, self.shortform.as_str())
            .into_iter()
            .filter_map(|offset| {
                let paren = offset - 1;
                let start = candidate_window_start(tokens, paren, self.window);
                let found = self.trie.search(&tokens[start..paren])?;
                Some(Recognition {
                    offset,
                    span: paren - found.tokens..paren,
                    longform: found.longform,
                    grounding: found.grounding,
                })
            })
            .collect()
    }

    /// Distinct groundings defined in `tokens`.
    pub fn groundings(&self, tokens: &[String]) -> BTreeSet<GroundingId> {
        self.recognize(tokens)
            .into_iter()
            .map(|r| r.grounding)
            .collect()
    }

    /// Text as it would read without its defining patterns.
    ///
    /// Every `( SF )` becomes a bare `SF`, and recognized longforms in front
    /// of it are removed, so training contexts look like the text a model
    /// sees at prediction time.
    pub fn strip_defining_patterns(&self, tokens: &[String]) -> Vec<String> {
        let spans = self.recognize(tokens).into_iter().map(|r| r.span);
        strip_spans(tokens, &self.shortform, spans)
    }
}

/// Drop the parentheses around every `( SF )` and the longform `spans`.
pub(crate) fn strip_spans<I>(tokens: &[String], shortform: &Shortform, spans: I) -> Vec<String>
where
    I: IntoIterator<Item = Range<usize>>,
{
    let mut removed = vec![false; tokens.len()];
    for offset in defining_pattern_offsets(tokens, shortform.as_str()) {
        removed[offset - 1] = true;
        if tokens.get(offset + 1).map(String::as_str) == Some(")") {
            removed[offset + 1] = true;
        }
    }
    for i in spans.into_iter().flatten() {
        removed[i] = true;
    }
    tokens
        .iter()
        .zip(removed)
        .filter(|(_, gone)| !gone)
        .map(|(t, _)| t.clone())
        .collect()
}
