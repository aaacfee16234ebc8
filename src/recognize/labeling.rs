use rayon::prelude::*;
use tracing::debug;

use crate::document::text::{context_window, find_occurrences};
use crate::document::Document;
use crate::types::example::TrainingExample;

use super::recognizer::Recognizer;

/// Build training examples from documents that define the shortform.
///
/// A document whose defining patterns all agree on one grounding is
/// labeled with it: its defining patterns are stripped and every remaining
/// occurrence of the shortform contributes one context window. Documents
/// with no recognized pattern, or with conflicting ones, yield nothing.
pub fn label_documents(
    documents: &[Document],
    recognizer: &Recognizer,
    radius: usize,
) -> Vec<TrainingExample> {
    let shortform = recognizer.shortform();
    let examples: Vec<TrainingExample> = documents
        .par_iter()
        .flat_map_iter(|document| {
            let groundings = recognizer.groundings(&document.tokens);
            let mut out = Vec::new();
            if groundings.len() != 1 {
                if groundings.len() > 1 {
                    debug!(
                        shortform = shortform.as_str(),
                        document = document.id.as_str(),
                        groundings = groundings.len(),
                        "conflicting defining patterns, document skipped"
                    );
                }
                return out;
            }
            let Some(label) = groundings.into_iter().next() else {
                return out;
            };
            let stripped = recognizer.strip_defining_patterns(&document.tokens);
            for offset in find_occurrences(&stripped, shortform.as_str()) {
                out.push(TrainingExample::new(
                    shortform.clone(),
                    context_window(&stripped, offset, radius).to_vec(),
                    label.clone(),
                ));
            }
            out
        })
        .collect();
    debug!(
        shortform = shortform.as_str(),
        documents = documents.len(),
        examples = examples.len(),
        "labeled documents"
    );
    examples
}
