//! Crate-level error for callers that do not need to tell the areas apart.

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{ModelError, TrainingError};
use crate::registry::{AliasError, PredictionError, StoreError};
use crate::types::identifiers::IdentifierError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    /// Malformed configuration or alias table.
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Alias(#[from] AliasError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// True for malformed configuration, including alias tables.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Alias(_) | Error::Training(TrainingError::InvalidConfig(_))
        )
    }

    /// True when a raw shortform is missing from the alias table.
    pub fn is_unknown_shortform(&self) -> bool {
        matches!(
            self,
            Error::Training(TrainingError::UnknownShortform(_))
                | Error::Prediction(PredictionError::UnknownShortform(_))
        )
    }
}
