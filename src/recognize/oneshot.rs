use std::collections::BTreeSet;
use std::ops::Range;

use tracing::trace;

use crate::config::MinerConfig;
use crate::document::text::{candidate_window_start, defining_pattern_offsets, normalize};
use crate::mining::align;
use crate::types::identifiers::Shortform;

use super::recognizer::strip_spans;

/// A longform read off one defining pattern by alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotMatch {
    /// Offset of the shortform token.
    pub offset: usize,
    /// Raw tokens of the aligned longform.
    pub span: Range<usize>,
    /// Normalized longform text.
    pub longform: String,
}

/// Finds the longform of each `longform ( SF )` pattern in a single text,
/// without a grounding map or a mined corpus.
///
/// The window in front of the pattern is sized and aligned exactly as the
/// miner does it, so a one-shot longform is the shortest aligned span the
/// miner would have counted for that occurrence.
#[derive(Debug, Clone)]
pub struct OneShotRecognizer {
    shortform: Shortform,
    letters: Vec<char>,
    window: usize,
}

impl OneShotRecognizer {
    pub fn new(shortform: Shortform, config: &MinerConfig) -> Self {
        Self {
            letters: shortform.letters(),
            window: config.window_len(shortform.surface_len()),
            shortform,
        }
    }

    pub fn shortform(&self) -> &Shortform {
        &self.shortform
    }

    /// One match per defining pattern whose window aligns.
    pub fn recognize(&self, tokens: &[String]) -> Vec<OneShotMatch> {
        defining_pattern_offsets(tokens, self.shortform.as_str())
            .into_iter()
            .filter_map(|offset| {
                let paren = offset - 1;
                let start = candidate_window_start(tokens, paren, self.window);
                let Some(first) = align(&self.letters, &tokens[start..paren]) else {
                    trace!(
                        shortform = self.shortform.as_str(),
                        offset,
                        "no alignment for defining pattern"
                    );
                    return None;
                };
                let span = start + first..paren;
                Some(OneShotMatch {
                    offset,
                    longform: normalize(&tokens[span.clone()].join(" ")),
                    span,
                })
            })
            .collect()
    }

    /// Distinct longforms defined in `tokens`.
    pub fn longforms(&self, tokens: &[String]) -> BTreeSet<String> {
        self.recognize(tokens)
            .into_iter()
            .map(|m| m.longform)
            .collect()
    }

    /// Text with every `( SF )` reduced to `SF` and aligned longforms removed.
    pub fn strip_defining_patterns(&self, tokens: &[String]) -> Vec<String> {
        let spans = self.recognize(tokens).into_iter().map(|m| m.span);
        strip_spans(tokens, &self.shortform, spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::text::tokenize;

    fn recognizer(sf: &str) -> OneShotRecognizer {
        OneShotRecognizer::new(Shortform::new(sf).unwrap(), &MinerConfig::v0())
    }

    #[test]
    fn aligned_longform_is_found_without_a_grounding_map() {
        let tokens = tokenize("Binding of the Estrogen Receptor (ER) to DNA.");
        let found = recognizer("ER").recognize(&tokens);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].longform, "estrogen receptor");
        assert_eq!(found[0].offset, 6);
        assert_eq!(&tokens[found[0].span.clone()], &["Estrogen", "Receptor"]);
    }

    #[test]
    fn stop_words_inside_the_longform_are_kept() {
        let tokens = tokenize("funding from the Department of Energy (DOE) grew");
        assert_eq!(
            recognizer("DOE").longforms(&tokens),
            BTreeSet::from(["department of energy".to_string()])
        );
    }

    #[test]
    fn each_pattern_is_recognized_separately() {
        let tokens =
            tokenize("The estrogen receptor (ER) is unlike the endoplasmic reticulum (ER).");
        let longforms: Vec<String> =
            recognizer("ER").recognize(&tokens).into_iter().map(|m| m.longform).collect();
        assert_eq!(longforms, vec!["estrogen receptor", "endoplasmic reticulum"]);
    }

    #[test]
    fn unalignable_window_yields_nothing() {
        let tokens = tokenize("the patients were (ER) admitted");
        assert!(recognizer("ER").recognize(&tokens).is_empty());
        assert!(recognizer("ER").recognize(&tokenize("the ER was busy")).is_empty());
    }

    #[test]
    fn strip_removes_aligned_longform() {
        let tokens = tokenize("Stress in the endoplasmic reticulum (ER) rose.");
        assert_eq!(
            recognizer("ER").strip_defining_patterns(&tokens).join(" "),
            "Stress in the ER rose ."
        );
    }
}
