use std::collections::BTreeMap;

use rust_stemmers::{Algorithm, Stemmer};

use crate::document::text::{is_word, normalize};
use crate::types::identifiers::GroundingId;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<String, usize>,
    terminal: Option<(String, GroundingId)>,
}

/// A longform found at the end of a token window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieMatch {
    pub longform: String,
    pub grounding: GroundingId,
    /// Raw tokens at the end of the window covered by the longform.
    pub tokens: usize,
}

/// Trie over normalized longforms, keyed by their stemmed words last to
/// first, so a window can be matched backwards from the `(` of a defining
/// pattern. `estrogen receptors` finds the longform `estrogen receptor`.
///
/// Longforms that stem to the same key keep the first grounding in
/// longform order.
#[derive(Debug, Clone)]
pub struct SearchTrie {
    nodes: Vec<TrieNode>,
}

impl SearchTrie {
    pub fn new(longforms: &BTreeMap<String, GroundingId>) -> Self {
        let mut trie = SearchTrie {
            nodes: vec![TrieNode::default()],
        };
        for (longform, grounding) in longforms {
            trie.insert(longform, grounding.clone());
        }
        trie
    }

    fn insert(&mut self, longform: &str, grounding: GroundingId) {
        let normalized = normalize(longform);
        if normalized.is_empty() {
            return;
        }
        let stemmer = english();
        let mut current = 0;
        for word in normalized.split(' ').rev() {
            let key = stemmer.stem(word);
            current = match self.nodes[current].children.get(key.as_ref()) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[current].children.insert(key.into_owned(), next);
                    next
                }
            };
        }
        let terminal = &mut self.nodes[current].terminal;
        if terminal.is_none() {
            *terminal = Some((normalized, grounding));
        }
    }

    /// Longest known longform ending at the last token of `window`.
    ///
    /// Punctuation tokens are stepped over; matches are only reported on
    /// raw token boundaries.
    pub fn search(&self, window: &[String]) -> Option<TrieMatch> {
        let stemmer = english();
        let mut current = 0;
        let mut best = None;
        for (consumed, token) in window.iter().rev().enumerate() {
            if !is_word(token) {
                continue;
            }
            let normalized = normalize(token);
            for word in normalized.split(' ').rev() {
                match self.nodes[current].children.get(stemmer.stem(word).as_ref()) {
                    Some(&next) => current = next,
                    None => return best,
                }
            }
            if let Some((longform, grounding)) = &self.nodes[current].terminal {
                best = Some(TrieMatch {
                    longform: longform.clone(),
                    grounding: grounding.clone(),
                    tokens: consumed + 1,
                });
            }
        }
        best
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }
}

fn english() -> Stemmer {
    Stemmer::create(Algorithm::English)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::text::tokenize;

    fn trie(pairs: &[(&str, &str)]) -> SearchTrie {
        let map = pairs
            .iter()
            .map(|(l, g)| (l.to_string(), GroundingId::new(*g).unwrap()))
            .collect();
        SearchTrie::new(&map)
    }

    #[test]
    fn longest_match_wins() {
        let t = trie(&[("receptor", "R"), ("estrogen receptor", "ESR")]);
        let m = t.search(&tokenize("the nuclear Estrogen Receptor")).unwrap();
        assert_eq!(m.grounding.as_str(), "ESR");
        assert_eq!(m.tokens, 2);
    }

    #[test]
    fn hyphenated_tokens_match_split_longforms() {
        let t = trie(&[("toll like receptor", "TLR")]);
        let m = t.search(&tokenize("a Toll-like receptor")).unwrap();
        assert_eq!(m.tokens, 2);
    }

    #[test]
    fn inflected_words_match_their_stem() {
        let t = trie(&[("estrogen receptor", "ESR")]);
        let m = t.search(&tokenize("levels of estrogen receptors")).unwrap();
        assert_eq!(m.longform, "estrogen receptor");
        assert_eq!(m.tokens, 2);

        let t = trie(&[("binding proteins", "BP")]);
        assert_eq!(t.search(&tokenize("a binding protein")).unwrap().longform, "binding proteins");
    }

    #[test]
    fn same_stem_keeps_first_longform() {
        let t = trie(&[("estrogen receptor", "A"), ("estrogen receptors", "B")]);
        let m = t.search(&tokenize("estrogen receptors")).unwrap();
        assert_eq!(m.grounding.as_str(), "A");
    }

    #[test]
    fn no_match_when_last_word_differs() {
        let t = trie(&[("estrogen receptor", "ESR")]);
        assert!(t.search(&tokenize("estrogen receptor alpha")).is_none());
    }
}
