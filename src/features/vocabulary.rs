use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::document::text::{is_stop_word, normalize};

use super::SparseVector;

/// Unigram and adjacent-pair terms of a context window.
///
/// Tokens are normalized and stop words dropped before pairing, so
/// `"the Estrogen-Receptor"` yields `estrogen`, `receptor` and
/// `estrogen receptor`.
pub fn extract_terms(context: &[String]) -> Vec<String> {
    let words: Vec<String> = context
        .iter()
        .flat_map(|token| {
            normalize(token)
                .split(' ')
                .filter(|w| !w.is_empty() && !is_stop_word(w))
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    let mut terms = words.clone();
    terms.extend(words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// Mutual information between a term's presence and the class label.
///
/// `df_by_class[c]`: examples of class `c` containing the term.
/// `class_totals[c]`: examples of class `c`.
fn mutual_information(df_by_class: &[usize], class_totals: &[usize], n: usize) -> f64 {
    let n = n as f64;
    let df: usize = df_by_class.iter().sum();
    let mut mi = 0.0;
    for (present, n_t) in [(true, df as f64), (false, n - df as f64)] {
        if n_t <= 0.0 {
            continue;
        }
        for (c, &total) in class_totals.iter().enumerate() {
            let n_tc = if present {
                df_by_class[c] as f64
            } else {
                (total - df_by_class[c]) as f64
            };
            if n_tc > 0.0 {
                mi += (n_tc / n) * (n_tc * n / (n_t * total as f64)).ln();
            }
        }
    }
    mi
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VocabularyRepr {
    terms: Vec<String>,
    idf: Vec<f64>,
}

/// Fitted, size-capped term vocabulary with IDF weights.
///
/// Term indices follow lexicographic order of the kept terms, so two fits
/// over the same examples agree index for index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VocabularyRepr", into = "VocabularyRepr")]
pub struct Vocabulary {
    terms: Vec<String>,
    idf: Vec<f64>,
    index: HashMap<String, usize>,
}

impl From<VocabularyRepr> for Vocabulary {
    fn from(repr: VocabularyRepr) -> Self {
        let index = repr
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Vocabulary {
            terms: repr.terms,
            idf: repr.idf,
            index,
        }
    }
}

impl From<Vocabulary> for VocabularyRepr {
    fn from(vocab: Vocabulary) -> Self {
        VocabularyRepr {
            terms: vocab.terms,
            idf: vocab.idf,
        }
    }
}

impl Vocabulary {
    /// Keep the `max_terms` terms with the highest mutual information with
    /// the label (ties: higher document frequency, then lexicographic).
    ///
    /// `labels[i]` is the class index of `contexts[i]`, below `n_classes`.
    pub fn fit<C>(contexts: &[C], labels: &[usize], n_classes: usize, max_terms: usize) -> Self
    where
        C: AsRef<[String]>,
    {
        debug_assert_eq!(contexts.len(), labels.len());
        let n = contexts.len();
        let mut class_totals = vec![0usize; n_classes];
        let mut df: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (context, &label) in contexts.iter().zip(labels) {
            class_totals[label] += 1;
            let present: BTreeSet<String> = extract_terms(context.as_ref()).into_iter().collect();
            for term in present {
                df.entry(term).or_insert_with(|| vec![0; n_classes])[label] += 1;
            }
        }

        let mut scored: Vec<(String, f64, usize)> = df
            .iter()
            .map(|(term, by_class)| {
                let mi = mutual_information(by_class, &class_totals, n);
                (term.clone(), mi, by_class.iter().sum())
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(max_terms);
        scored.sort_by(|a, b| a.0.cmp(&b.0));

        let n = n as f64;
        let repr = VocabularyRepr {
            idf: scored
                .iter()
                .map(|(_, _, df)| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
                .collect(),
            terms: scored.into_iter().map(|(term, _, _)| term).collect(),
        };
        repr.into()
    }

    /// L2-normalized TF-IDF vector of a context window. Out-of-vocabulary
    /// terms are ignored; a window with no known term maps to the empty
    /// vector.
    pub fn transform(&self, context: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in extract_terms(context) {
            if let Some(&i) = self.index.get(&term) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }
        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in entries.iter_mut() {
                *v /= norm;
            }
        }
        SparseVector { entries }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
