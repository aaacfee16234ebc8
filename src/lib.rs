//! Abbreviation longform mining and context-based shortform disambiguation.
//!
//! `shortform-core` mines candidate expansions of a shortform from
//! `longform ( SF )` defining patterns, turns them into a grounding map,
//! labels training contexts, and trains one calibrated linear classifier
//! per canonical shortform. Aliased shortforms share one model through the
//! alias table. Mining, training and prediction are deterministic:
//! identical inputs and configuration give identical outputs.

pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod features;
pub mod mining;
pub mod model;
pub mod recognize;
pub mod registry;
pub mod types;

pub use config::{Config, MinerConfig, PredictionConfig, TrainingConfig};
pub use error::{Error, Result};
pub use mining::{mine_longforms, LongformMiner};
pub use model::{
    load_disambiguator, train_disambiguator, DisambiguationModel, Occurrences, Prediction,
};
pub use registry::{AliasTable, ModelRegistry};
pub use types::{Grounding, GroundingId, GroundingMap, Shortform, TrainingExample};

/// Disambiguate every occurrence in `texts`, in input order.
pub fn disambiguate(
    model: &DisambiguationModel,
    texts: &[Occurrences<'_>],
    config: &PredictionConfig,
) -> Vec<Prediction> {
    model.disambiguate(texts, config)
}
