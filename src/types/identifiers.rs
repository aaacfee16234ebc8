use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Reserved grounding reported when no sense clears the confidence threshold.
pub const UNGROUNDED: &str = "ungrounded";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Shortform must not be empty")]
    EmptyShortform,
    #[error("Shortform {0:?} may only contain letters, digits and hyphens")]
    InvalidShortform(String),
    #[error("Grounding id must not be empty")]
    EmptyGrounding,
    #[error("Grounding id {UNGROUNDED:?} is reserved for low-confidence predictions")]
    ReservedGrounding,
}

/// An abbreviation as it appears in text, e.g. `ER` or `IL-6`.
///
/// Shortforms are case-sensitive: `ER` and `Er` are distinct surface strings
/// and may be routed to one model through the alias table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Shortform(String);

impl Shortform {
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentifierError::EmptyShortform);
        }
        if !raw.chars().all(|c| c.is_alphanumeric() || c == '-')
            || !raw.chars().any(char::is_alphanumeric)
        {
            return Err(IdentifierError::InvalidShortform(raw));
        }
        Ok(Shortform(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded alphanumeric characters, the letters a longform must align to.
    pub fn letters(&self) -> Vec<char> {
        self.0
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(|c| c.to_lowercase())
            .collect()
    }

    /// Characters as written, hyphens included. Sizes the search window.
    pub fn surface_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Number of alignable characters.
    pub fn len(&self) -> usize {
        self.0.chars().filter(|c| c.is_alphanumeric()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<String> for Shortform {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Shortform::new(value)
    }
}

impl From<Shortform> for String {
    fn from(value: Shortform) -> Self {
        value.0
    }
}

impl Borrow<str> for Shortform {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Shortform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable key of one real-world sense, e.g. `HGNC:3467` or `GO:0005783`.
///
/// [`UNGROUNDED`] can only be built through [`GroundingId::ungrounded`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundingId(String);

impl GroundingId {
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(IdentifierError::EmptyGrounding);
        }
        if raw == UNGROUNDED {
            return Err(IdentifierError::ReservedGrounding);
        }
        Ok(GroundingId(raw))
    }

    pub fn ungrounded() -> Self {
        GroundingId(UNGROUNDED.to_string())
    }

    pub fn is_ungrounded(&self) -> bool {
        self.0 == UNGROUNDED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GroundingId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroundingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-assigned document key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(raw: impl Into<String>) -> Self {
        DocumentId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content hash version, `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentVersion(String);

impl ContentVersion {
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        ContentVersion(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First twelve hex characters, used for on-disk file names.
    pub fn short(&self) -> &str {
        let hex = self.0.strip_prefix("sha256:").unwrap_or(&self.0);
        &hex[..hex.len().min(12)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortform_rejects_whitespace_and_punctuation() {
        assert!(Shortform::new("IL-6").is_ok());
        assert_eq!(Shortform::new(""), Err(IdentifierError::EmptyShortform));
        assert!(matches!(Shortform::new("E R"), Err(IdentifierError::InvalidShortform(_))));
        assert!(matches!(Shortform::new("(ER)"), Err(IdentifierError::InvalidShortform(_))));
        assert!(matches!(Shortform::new("-"), Err(IdentifierError::InvalidShortform(_))));
        assert!(matches!(Shortform::new("--"), Err(IdentifierError::InvalidShortform(_))));
    }

    #[test]
    fn ungrounded_is_not_a_label() {
        assert_eq!(GroundingId::new(UNGROUNDED), Err(IdentifierError::ReservedGrounding));
        assert_eq!(GroundingId::new("  "), Err(IdentifierError::EmptyGrounding));
        assert!(GroundingId::ungrounded().is_ungrounded());
        assert!(!GroundingId::new("Ungrounded").unwrap().is_ungrounded());
    }

    #[test]
    fn shortform_letters_skip_hyphens_and_fold_case() {
        let sf = Shortform::new("IL-6").unwrap();
        assert_eq!(sf.letters(), vec!['i', 'l', '6']);
        assert_eq!(sf.len(), 3);
        assert_eq!(sf.surface_len(), 4);
    }

    #[test]
    fn version_short_form_is_twelve_hex_chars() {
        let v = ContentVersion::from_content(b"content");
        assert!(v.as_str().starts_with("sha256:"));
        assert_eq!(v.short().len(), 12);
    }
}
