use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::identifiers::Shortform;

/// A malformed alias table. Always fatal at load time.
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("Alias {alias} is mapped to both {first} and {second}")]
    ConflictingAlias {
        alias: Shortform,
        first: Shortform,
        second: Shortform,
    },
    #[error("Alias cycle: {}", format_path(.path))]
    Cycle { path: Vec<Shortform> },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_path(path: &[Shortform]) -> String {
    path.iter()
        .map(Shortform::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// One routing line: raw surface string → canonical model key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: Shortform,
    pub canonical: Shortform,
}

/// Raw shortform → canonical shortform used to pick a trained model.
///
/// Guaranteed on construction: every raw string routes to exactly one
/// canonical key, chains are collapsed onto their terminal key, and there
/// are no cycles. Canonical keys route to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AliasEntry>", into = "Vec<AliasEntry>")]
pub struct AliasTable {
    routes: BTreeMap<Shortform, Shortform>,
}

impl AliasTable {
    /// Every shortform is its own canonical key.
    pub fn identity<I>(shortforms: I) -> Self
    where
        I: IntoIterator<Item = Shortform>,
    {
        let routes = shortforms.into_iter().map(|sf| (sf.clone(), sf)).collect();
        AliasTable { routes }
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, AliasError>
    where
        I: IntoIterator<Item = (Shortform, Shortform)>,
    {
        let mut direct: BTreeMap<Shortform, Shortform> = BTreeMap::new();
        for (alias, canonical) in pairs {
            match direct.get(&alias) {
                Some(existing) if *existing != canonical => {
                    return Err(AliasError::ConflictingAlias {
                        alias,
                        first: existing.clone(),
                        second: canonical,
                    });
                }
                Some(_) => {}
                None => {
                    direct.insert(alias, canonical);
                }
            }
        }

        let mut routes = BTreeMap::new();
        for alias in direct.keys() {
            let terminal = follow(&direct, alias)?;
            routes.insert(terminal.clone(), terminal.clone());
            routes.insert(alias.clone(), terminal);
        }
        Ok(AliasTable { routes })
    }

    pub fn from_json_str(json: &str) -> Result<Self, AliasError> {
        let entries: Vec<AliasEntry> = serde_json::from_str(json)?;
        Self::try_from(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self, AliasError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Canonical key for a raw shortform, if registered.
    pub fn resolve(&self, raw: &str) -> Option<&Shortform> {
        self.routes.get(raw)
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.routes.contains_key(raw)
    }

    pub fn canonical_keys(&self) -> BTreeSet<&Shortform> {
        self.routes.values().collect()
    }

    /// Every raw string routed to `canonical`, including itself.
    pub fn aliases_of(&self, canonical: &str) -> BTreeSet<Shortform> {
        self.routes
            .iter()
            .filter(|(_, c)| c.as_str() == canonical)
            .map(|(raw, _)| raw.clone())
            .collect()
    }

    pub fn entries(&self) -> Vec<AliasEntry> {
        self.routes
            .iter()
            .map(|(alias, canonical)| AliasEntry {
                alias: alias.clone(),
                canonical: canonical.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Walk `alias → … → terminal`, failing on a revisit.
fn follow(direct: &BTreeMap<Shortform, Shortform>, alias: &Shortform) -> Result<Shortform, AliasError> {
    let mut path = vec![alias.clone()];
    let mut current = alias;
    while let Some(next) = direct.get(current) {
        if next == current {
            break;
        }
        if path.contains(next) {
            path.push(next.clone());
            return Err(AliasError::Cycle { path });
        }
        path.push(next.clone());
        current = next;
    }
    Ok(current.clone())
}

impl TryFrom<Vec<AliasEntry>> for AliasTable {
    type Error = AliasError;

    fn try_from(entries: Vec<AliasEntry>) -> Result<Self, Self::Error> {
        AliasTable::from_pairs(entries.into_iter().map(|e| (e.alias, e.canonical)))
    }
}

impl From<AliasTable> for Vec<AliasEntry> {
    fn from(table: AliasTable) -> Self {
        table.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf(s: &str) -> Shortform {
        Shortform::new(s).unwrap()
    }

    #[test]
    fn chains_collapse_to_terminal_key() {
        let table = AliasTable::from_pairs([(sf("Er"), sf("ER-1")), (sf("ER-1"), sf("ER"))]).unwrap();
        assert_eq!(table.resolve("Er"), Some(&sf("ER")));
        assert_eq!(table.resolve("ER"), Some(&sf("ER")));
        assert_eq!(table.aliases_of("ER").len(), 3);
    }

    #[test]
    fn cycle_path_is_reported() {
        let err = AliasTable::from_pairs([(sf("A"), sf("B")), (sf("B"), sf("A"))]).unwrap_err();
        match err {
            AliasError::Cycle { path } => assert_eq!(path, vec![sf("A"), sf("B"), sf("A")]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn repeating_the_same_pair_is_harmless() {
        let table = AliasTable::from_pairs([(sf("Er"), sf("ER")), (sf("Er"), sf("ER"))]).unwrap();
        assert_eq!(table.len(), 2);
    }
}
