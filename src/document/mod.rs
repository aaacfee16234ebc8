pub mod document;
pub mod text;

pub use crate::types::identifiers::{ContentVersion, DocumentId};
pub use document::Document;
pub use text::{
    context_window, defining_pattern_offsets, find_occurrences, normalize, tokenize,
};
