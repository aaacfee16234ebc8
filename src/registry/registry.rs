use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::PredictionConfig;
use crate::model::{DisambiguationModel, Occurrences, Prediction};
use crate::types::identifiers::Shortform;

use super::alias::AliasTable;
use super::store::{ModelStore, StoreError};

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Unknown shortform {0:?}: not registered in the alias table")]
    UnknownShortform(String),
    #[error("No model loaded for {canonical} (requested as {raw:?})")]
    NotLoaded { raw: String, canonical: Shortform },
}

/// Loaded models and the alias routing in front of them.
///
/// Every alias of a canonical key resolves to the same `Arc`, so aliases
/// always agree on their predictions. Models are only replaced or removed
/// through [`ModelRegistry::insert`] and [`ModelRegistry::evict`].
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    aliases: AliasTable,
    models: BTreeMap<Shortform, Arc<DisambiguationModel>>,
    prediction: PredictionConfig,
}

impl ModelRegistry {
    pub fn new(aliases: AliasTable, prediction: PredictionConfig) -> Self {
        Self {
            aliases,
            models: BTreeMap::new(),
            prediction,
        }
    }

    /// Registry over every model in a store, with the store's alias table.
    pub fn from_store(store: &ModelStore, prediction: PredictionConfig) -> Result<Self, StoreError> {
        let mut registry = Self::new(store.load_aliases()?, prediction);
        for model in store.load_models()? {
            let key = model.shortform().clone();
            registry
                .insert(model)
                .map_err(|_| StoreError::UnroutedModel(key))?;
        }
        Ok(registry)
    }

    /// Load a model under its canonical key, returning the one it replaces.
    pub fn insert(
        &mut self,
        model: DisambiguationModel,
    ) -> Result<Option<Arc<DisambiguationModel>>, PredictionError> {
        let key = model.shortform().clone();
        if !self.aliases.canonical_keys().contains(&key) {
            return Err(PredictionError::UnknownShortform(key.to_string()));
        }
        info!(
            shortform = key.as_str(),
            groundings = model.groundings().len(),
            "model loaded"
        );
        Ok(self.models.insert(key, Arc::new(model)))
    }

    /// Drop the model behind `raw`'s canonical key. Callers still holding
    /// the `Arc` keep a working model.
    pub fn evict(&mut self, raw: &str) -> Result<Option<Arc<DisambiguationModel>>, PredictionError> {
        let key = self.resolve(raw)?.clone();
        let evicted = self.models.remove(&key);
        if evicted.is_some() {
            info!(shortform = key.as_str(), "model evicted");
        }
        Ok(evicted)
    }

    pub fn resolve(&self, raw: &str) -> Result<&Shortform, PredictionError> {
        self.aliases
            .resolve(raw)
            .ok_or_else(|| PredictionError::UnknownShortform(raw.to_string()))
    }

    pub fn model_for(&self, raw: &str) -> Result<Arc<DisambiguationModel>, PredictionError> {
        let canonical = self.resolve(raw)?;
        self.models
            .get(canonical)
            .cloned()
            .ok_or_else(|| PredictionError::NotLoaded {
                raw: raw.to_string(),
                canonical: canonical.clone(),
            })
    }

    pub fn predict(&self, raw: &str, context: &[String]) -> Result<Prediction, PredictionError> {
        let model = self.model_for(raw)?;
        Ok(model.predict(context, self.prediction.confidence_threshold))
    }

    pub fn disambiguate(
        &self,
        raw: &str,
        texts: &[Occurrences<'_>],
    ) -> Result<Vec<Prediction>, PredictionError> {
        let model = self.model_for(raw)?;
        Ok(model.disambiguate(texts, &self.prediction))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn prediction_config(&self) -> &PredictionConfig {
        &self.prediction
    }

    /// Canonical keys with a loaded model.
    pub fn loaded(&self) -> impl Iterator<Item = &Shortform> {
        self.models.keys()
    }
}
