use serde::{Deserialize, Serialize};

use crate::types::identifiers::{ContentVersion, DocumentId};
use super::text::tokenize;

/// A tokenized unit of corpus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub version: ContentVersion,
    pub tokens: Vec<String>,
}

impl Document {
    /// Wrap tokens produced by an external tokenizer.
    ///
    /// The version is computed over the tokens joined by a single space, so
    /// two documents with equal token sequences share a version.
    pub fn from_tokens(id: DocumentId, tokens: Vec<String>) -> Self {
        let version = ContentVersion::from_content(tokens.join(" ").as_bytes());
        Document { id, version, tokens }
    }

    /// Tokenize raw text with the built-in splitter.
    pub fn from_text(id: DocumentId, text: &str) -> Self {
        Self::from_tokens(id, tokenize(text))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
