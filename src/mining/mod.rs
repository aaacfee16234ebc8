//! Acromine-style longform mining.
//!
//! Every `longform ( SF )` defining pattern contributes its maximal aligned
//! span, and all of that span's suffixes, to a per-shortform candidate
//! tree. Canonical longforms are read off the tree by following stable
//! specializations from the most general candidates.

pub mod alignment;
pub mod miner;
pub mod tree;

pub use alignment::align;
pub use miner::{mine_longforms, LongformMiner, OccurrenceStats};
pub use tree::{CandidateNode, CandidateTree, NodeId, ROOT};
