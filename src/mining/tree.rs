use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::document::text::normalize;
use crate::types::grounding::{entry_order, GroundingEntry};

pub type NodeId = usize;

/// The empty longform every candidate chain hangs from.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct CandidateNode {
    /// Normalized candidate text; empty for the root.
    pub text: String,
    pub frequency: usize,
    /// Raw surface spans that normalized to `text`.
    pub variants: BTreeSet<String>,
    /// The same text minus its leading word.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl CandidateNode {
    fn new(text: String, parent: Option<NodeId>) -> Self {
        Self {
            text,
            frequency: 0,
            variants: BTreeSet::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// Per-shortform candidate tree, stored as an arena indexed by [`NodeId`].
///
/// A node's parent is its text with the leading word dropped, so the shape
/// of the tree is a function of the set of texts alone. This is what makes
/// [`CandidateTree::merge`] commutative and associative.
///
/// Parents are always allocated before their children; arena order is a
/// valid topological order.
#[derive(Debug, Clone)]
pub struct CandidateTree {
    nodes: Vec<CandidateNode>,
    index: HashMap<String, NodeId>,
}

impl Default for CandidateTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateTree {
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), ROOT);
        Self {
            nodes: vec![CandidateNode::new(String::new(), None)],
            index,
        }
    }

    /// Record one occurrence of a maximal candidate given as raw tokens.
    ///
    /// Every suffix of the normalized candidate (dropping leading words one
    /// at a time) gets its frequency incremented, from the single last word
    /// up to the full span. Raw variants are kept for suffixes that start on
    /// a raw token boundary.
    pub fn insert(&mut self, raw_tokens: &[String]) {
        let mut words: Vec<String> = Vec::new();
        // Raw token index for words that start a raw token.
        let mut boundary: Vec<Option<usize>> = Vec::new();
        for (t, token) in raw_tokens.iter().enumerate() {
            let normalized = normalize(token);
            for (k, word) in normalized.split(' ').filter(|w| !w.is_empty()).enumerate() {
                words.push(word.to_string());
                boundary.push((k == 0).then_some(t));
            }
        }
        if words.is_empty() {
            return;
        }

        self.nodes[ROOT].frequency += 1;
        let mut parent = ROOT;
        for start in (0..words.len()).rev() {
            let text = words[start..].join(" ");
            let id = self.get_or_create(text, parent);
            let node = &mut self.nodes[id];
            node.frequency += 1;
            if let Some(t) = boundary[start] {
                node.variants.insert(raw_tokens[t..].join(" "));
            }
            parent = id;
        }
    }

    fn get_or_create(&mut self, text: String, parent: NodeId) -> NodeId {
        if let Some(&id) = self.index.get(&text) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(CandidateNode::new(text.clone(), Some(parent)));
        self.nodes[parent].children.push(id);
        self.index.insert(text, id);
        id
    }

    /// Fold `other` into `self` node by node, matching on normalized text.
    pub fn merge(&mut self, other: &CandidateTree) {
        // Maps other's ids onto ours; parents are visited before children.
        let mut mapped: Vec<NodeId> = Vec::with_capacity(other.nodes.len());
        for node in &other.nodes {
            let id = match node.parent {
                None => ROOT,
                Some(p) => self.get_or_create(node.text.clone(), mapped[p]),
            };
            let target = &mut self.nodes[id];
            target.frequency += node.frequency;
            target.variants.extend(node.variants.iter().cloned());
            mapped.push(id);
        }
    }

    /// Copy of the tree without nodes below `min_support`.
    ///
    /// Frequencies never grow from parent to child, so the kept set is
    /// closed under taking parents.
    pub fn pruned(&self, min_support: usize) -> CandidateTree {
        let mut out = CandidateTree::new();
        out.nodes[ROOT].frequency = self.nodes[ROOT].frequency;
        let mut mapped: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        mapped[ROOT] = Some(ROOT);
        for (id, node) in self.nodes.iter().enumerate().skip(1) {
            if node.frequency < min_support {
                continue;
            }
            let Some(parent) = node.parent.and_then(|p| mapped[p]) else {
                continue;
            };
            let new_id = out.get_or_create(node.text.clone(), parent);
            out.nodes[new_id].frequency = node.frequency;
            out.nodes[new_id].variants = node.variants.clone();
            mapped[id] = Some(new_id);
        }
        out
    }

    /// Canonical longforms, one per first-level tree of the forest.
    ///
    /// From each child of the root, keep moving to the most frequent child
    /// while it reaches `min_support` and `child / node >= ratio`; emit the
    /// node where the walk stops. Output is ordered by frequency, longer
    /// text first on ties.
    pub fn select(&self, min_support: usize, ratio: f64) -> Vec<GroundingEntry> {
        let tree = self.pruned(min_support);
        let mut entries: Vec<GroundingEntry> = tree.nodes[ROOT]
            .children
            .iter()
            .map(|&top| {
                let mut current = top;
                while let Some(best) = tree.best_child(current) {
                    let node = &tree.nodes[current];
                    let child = &tree.nodes[best];
                    let stable = child.frequency as f64 / node.frequency as f64 >= ratio;
                    if child.frequency < min_support || !stable {
                        break;
                    }
                    current = best;
                }
                let node = &tree.nodes[current];
                GroundingEntry {
                    longform: node.text.clone(),
                    frequency: node.frequency,
                    variants: node.variants.clone(),
                }
            })
            .collect();
        entries.sort_by(entry_order);
        entries
    }

    /// Most frequent child; ties go to the longer, then lexicographically
    /// smaller text.
    fn best_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].children.iter().copied().min_by(|&a, &b| {
            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| b.text.len().cmp(&a.text.len()))
                .then_with(|| a.text.cmp(&b.text))
        })
    }

    pub fn get(&self, text: &str) -> Option<&CandidateNode> {
        self.index.get(text).map(|&id| &self.nodes[id])
    }

    pub fn node(&self, id: NodeId) -> &CandidateNode {
        &self.nodes[id]
    }

    /// Number of occurrences that produced a candidate.
    pub fn total(&self) -> usize {
        self.nodes[ROOT].frequency
    }

    /// Number of candidate nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order-independent view: text → (frequency, variants).
    pub fn snapshot(&self) -> BTreeMap<String, (usize, BTreeSet<String>)> {
        self.nodes
            .iter()
            .map(|n| (n.text.clone(), (n.frequency, n.variants.clone())))
            .collect()
    }
}

impl PartialEq for CandidateTree {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl Eq for CandidateTree {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::text::tokenize;

    fn tree_of(spans: &[&str]) -> CandidateTree {
        let mut tree = CandidateTree::new();
        for span in spans {
            tree.insert(&tokenize(span));
        }
        tree
    }

    #[test]
    fn insert_builds_suffix_chain() {
        let tree = tree_of(&["Estrogen Receptor"]);
        assert_eq!(tree.len(), 2);
        let leaf = tree.get("estrogen receptor").unwrap();
        let parent = tree.node(leaf.parent.unwrap());
        assert_eq!(parent.text, "receptor");
        assert_eq!(parent.parent, Some(ROOT));
        assert!(leaf.variants.contains("Estrogen Receptor"));
    }

    #[test]
    fn repeated_spans_accumulate_instead_of_duplicating() {
        let tree = tree_of(&["estrogen receptor", "Estrogen receptor", "endothelin receptor"]);
        assert_eq!(tree.get("receptor").unwrap().frequency, 3);
        let er = tree.get("estrogen receptor").unwrap();
        assert_eq!(er.frequency, 2);
        assert_eq!(er.variants.len(), 2);
        assert_eq!(tree.total(), 3);
    }

    #[test]
    fn hyphenated_token_records_variant_only_on_boundary() {
        let tree = tree_of(&["Toll-like receptor"]);
        assert!(tree.get("like receptor").unwrap().variants.is_empty());
        assert!(tree.get("toll like receptor").unwrap().variants.contains("Toll-like receptor"));
    }

    #[test]
    fn select_follows_stable_specialization() {
        let tree = tree_of(&[
            "estrogen receptor",
            "estrogen receptor",
            "estrogen receptor",
            "endoplasmic reticulum",
            "endoplasmic reticulum",
        ]);
        let entries = tree.select(1, 0.1);
        let texts: Vec<_> = entries.iter().map(|e| e.longform.as_str()).collect();
        assert_eq!(texts, vec!["estrogen receptor", "endoplasmic reticulum"]);
        assert_eq!(entries[0].frequency, 3);
    }

    #[test]
    fn select_stops_when_child_is_rare() {
        let mut spans = vec!["receptor"; 20];
        spans.push("estrogen receptor");
        let tree = tree_of(&spans);
        let entries = tree.select(1, 0.1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].longform, "receptor");
        assert_eq!(entries[0].frequency, 21);
    }

    #[test]
    fn pruning_drops_unsupported_nodes() {
        let tree = tree_of(&["estrogen receptor", "estrogen receptor", "endothelin receptor"]);
        let pruned = tree.pruned(2);
        assert!(pruned.get("endothelin receptor").is_none());
        assert_eq!(pruned.get("estrogen receptor").unwrap().frequency, 2);
    }

    #[test]
    fn merge_matches_single_tree() {
        let a = tree_of(&["estrogen receptor"]);
        let b = tree_of(&["Estrogen Receptor", "endoplasmic reticulum"]);
        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        let whole = tree_of(&["estrogen receptor", "Estrogen Receptor", "endoplasmic reticulum"]);
        assert_eq!(ab, whole);
        assert_eq!(ba, whole);
    }
}
