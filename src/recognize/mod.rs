//! Recognition of defining patterns, either against already-grounded
//! longforms or by alignment alone, and the training-set builder that
//! relies on the former.

pub mod labeling;
pub mod oneshot;
pub mod recognizer;
pub mod trie;

pub use labeling::label_documents;
pub use oneshot::{OneShotMatch, OneShotRecognizer};
pub use recognizer::{Recognition, Recognizer};
pub use trie::{SearchTrie, TrieMatch};
