use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::LinearClassifier;
use crate::config::PredictionConfig;
use crate::document::text::context_window;
use crate::features::Vocabulary;
use crate::types::identifiers::{ContentVersion, GroundingId, Shortform};

use super::prediction::{Occurrences, Prediction};
use super::training::TrainingStats;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Model version mismatch for {shortform}: artifact says {expected}, content hashes to {actual}")]
    VersionMismatch {
        shortform: Shortform,
        expected: String,
        actual: String,
    },
    #[error("Malformed model for {shortform}: {reason}")]
    Malformed { shortform: Shortform, reason: String },
}

/// A trained disambiguator for one canonical shortform.
///
/// Immutable once built. Registries share it behind an `Arc` across every
/// alias routed to its shortform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationModel {
    shortform: Shortform,
    /// Raw shortforms routed here when the model was trained.
    aliases: BTreeSet<Shortform>,
    /// Class order of the classifier.
    groundings: Vec<GroundingId>,
    vocabulary: Vocabulary,
    classifier: LinearClassifier,
    stats: TrainingStats,
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    version: ContentVersion,
    model: &'a DisambiguationModel,
}

#[derive(Deserialize)]
struct Artifact {
    version: ContentVersion,
    model: DisambiguationModel,
}

impl DisambiguationModel {
    pub(crate) fn from_parts(
        shortform: Shortform,
        aliases: BTreeSet<Shortform>,
        groundings: Vec<GroundingId>,
        vocabulary: Vocabulary,
        classifier: LinearClassifier,
        stats: TrainingStats,
    ) -> Self {
        Self {
            shortform,
            aliases,
            groundings,
            vocabulary,
            classifier,
            stats,
        }
    }

    /// Canonical key this model was trained for.
    pub fn shortform(&self) -> &Shortform {
        &self.shortform
    }

    pub fn aliases(&self) -> &BTreeSet<Shortform> {
        &self.aliases
    }

    pub fn groundings(&self) -> &[GroundingId] {
        &self.groundings
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Full probability distribution over the model's groundings.
    pub fn distribution(&self, context: &[String]) -> BTreeMap<GroundingId, f64> {
        let features = self.vocabulary.transform(context);
        let probabilities = self.classifier.predict_proba(&features);
        self.groundings
            .iter()
            .cloned()
            .zip(probabilities)
            .collect()
    }

    /// Disambiguate one context window against threshold τ.
    pub fn predict(&self, context: &[String], threshold: f64) -> Prediction {
        Prediction::from_distribution(self.distribution(context), threshold)
    }

    /// [`DisambiguationModel::predict`] over many windows on the rayon
    /// pool. Output order matches input order.
    pub fn predict_batch<W>(&self, contexts: &[W], threshold: f64) -> Vec<Prediction>
    where
        W: AsRef<[String]> + Sync,
    {
        contexts
            .par_iter()
            .map(|context| self.predict(context.as_ref(), threshold))
            .collect()
    }

    /// One prediction per occurrence, in input order: texts first, then
    /// offsets within each text. An offset past the end of its text is
    /// predicted from an empty context.
    pub fn disambiguate(&self, texts: &[Occurrences<'_>], config: &PredictionConfig) -> Vec<Prediction> {
        let windows: Vec<&[String]> = texts
            .iter()
            .flat_map(|text| {
                text.offsets
                    .iter()
                    .map(move |&offset| context_window(text.tokens, offset, config.context_radius))
            })
            .collect();
        self.predict_batch(&windows, config.confidence_threshold)
    }

    /// Vocabulary terms with the largest positive weight for `grounding`.
    pub fn top_features(&self, grounding: &str, n: usize) -> Vec<(String, f64)> {
        let Some(class) = self.groundings.iter().position(|g| g.as_str() == grounding) else {
            return Vec::new();
        };
        self.classifier
            .top_features(class, n)
            .into_iter()
            .filter_map(|(i, w)| self.vocabulary.term(i).map(|t| (t.to_string(), w)))
            .collect()
    }

    /// Content hash over the model's logical contents.
    pub fn version(&self) -> Result<ContentVersion, ModelError> {
        Ok(ContentVersion::from_content(&serde_json::to_vec(self)?))
    }

    /// Serialized artifact carrying the model and its version.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let artifact = ArtifactRef {
            version: self.version()?,
            model: self,
        };
        Ok(serde_json::to_vec(&artifact)?)
    }

    fn check(&self) -> Result<(), ModelError> {
        let malformed = |reason: String| ModelError::Malformed {
            shortform: self.shortform.clone(),
            reason,
        };
        if self.classifier.n_classes() != self.groundings.len() {
            return Err(malformed(format!(
                "{} classes for {} groundings",
                self.classifier.n_classes(),
                self.groundings.len()
            )));
        }
        if self.classifier.n_features() != self.vocabulary.len() {
            return Err(malformed(format!(
                "{} weights per class for {} vocabulary terms",
                self.classifier.n_features(),
                self.vocabulary.len()
            )));
        }
        Ok(())
    }
}

/// Rebuild a model from [`DisambiguationModel::to_bytes`] output, verifying
/// its content version and internal dimensions.
pub fn load_disambiguator(bytes: &[u8]) -> Result<DisambiguationModel, ModelError> {
    let artifact: Artifact = serde_json::from_slice(bytes)?;
    let model = artifact.model;
    let actual = model.version()?;
    if actual != artifact.version {
        return Err(ModelError::VersionMismatch {
            shortform: model.shortform.clone(),
            expected: artifact.version.as_str().to_string(),
            actual: actual.as_str().to_string(),
        });
    }
    model.check()?;
    Ok(model)
}
