use serde::{Deserialize, Serialize};

use crate::types::identifiers::{GroundingId, Shortform};

/// A labeled context window for one shortform occurrence.
///
/// `shortform` is the raw surface string seen in text; the alias table
/// routes it to the canonical key whose model the example trains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub shortform: Shortform,
    pub context: Vec<String>,
    pub label: GroundingId,
}

impl TrainingExample {
    pub fn new(shortform: Shortform, context: Vec<String>, label: GroundingId) -> Self {
        Self {
            shortform,
            context,
            label,
        }
    }
}
