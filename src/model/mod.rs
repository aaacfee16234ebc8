//! Per-shortform disambiguation models: training, prediction and the
//! serialized artifact.

pub mod disambiguator;
pub mod prediction;
pub mod training;

pub use disambiguator::{load_disambiguator, DisambiguationModel, ModelError};
pub use prediction::{Occurrences, Prediction};
pub use training::{
    group_by_canonical, train_all, train_disambiguator, TrainingError, TrainingStats,
};
