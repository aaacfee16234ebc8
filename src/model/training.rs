use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::{
    argmax, effective_folds, fit_temperature, macro_f1, stratified_folds, FitParams,
    LinearClassifier,
};
use crate::config::{ConfigError, TrainingConfig};
use crate::features::Vocabulary;
use crate::registry::alias::AliasTable;
use crate::types::example::TrainingExample;
use crate::types::identifiers::{GroundingId, Shortform};

use super::disambiguator::DisambiguationModel;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Unknown shortform {0:?}: not registered in the alias table")]
    UnknownShortform(String),
    #[error(
        "Insufficient data for {shortform}: need two groundings with at least {min_per_class} examples each, have {}",
        format_counts(.counts)
    )]
    InsufficientData {
        shortform: Shortform,
        counts: BTreeMap<GroundingId, usize>,
        min_per_class: usize,
    },
}

fn format_counts(counts: &BTreeMap<GroundingId, usize>) -> String {
    if counts.is_empty() {
        return "no examples".to_string();
    }
    counts
        .iter()
        .map(|(id, n)| format!("{id}={n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// What training saw and chose, kept with the model for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Examples per grounding, including groundings dropped for lack of data.
    pub class_counts: BTreeMap<GroundingId, usize>,
    /// Chosen inverse regularization strength.
    pub regularization: f64,
    /// Out-of-fold macro-F1 at the chosen strength.
    pub cv_macro_f1: f64,
    pub temperature: f64,
    pub folds: usize,
}

/// Route every example to its canonical shortform.
///
/// Fails on the first example whose raw shortform the table does not know.
pub fn group_by_canonical<'a>(
    examples: &'a [TrainingExample],
    aliases: &AliasTable,
) -> Result<BTreeMap<Shortform, Vec<&'a TrainingExample>>, TrainingError> {
    let mut groups: BTreeMap<Shortform, Vec<&TrainingExample>> = BTreeMap::new();
    for example in examples {
        let canonical = aliases
            .resolve(example.shortform.as_str())
            .ok_or_else(|| TrainingError::UnknownShortform(example.shortform.to_string()))?;
        groups.entry(canonical.clone()).or_default().push(example);
    }
    Ok(groups)
}

/// Train the model for the canonical key `shortform` routes to, from the
/// examples whose raw shortforms route to the same key.
pub fn train_disambiguator(
    shortform: &Shortform,
    examples: &[TrainingExample],
    aliases: &AliasTable,
    config: &TrainingConfig,
) -> Result<DisambiguationModel, TrainingError> {
    config.validate()?;
    let canonical = aliases
        .resolve(shortform.as_str())
        .ok_or_else(|| TrainingError::UnknownShortform(shortform.to_string()))?
        .clone();

    let mut groups = group_by_canonical(examples, aliases)?;
    let selected = groups.remove(&canonical).unwrap_or_default();
    let skipped: usize = groups.values().map(Vec::len).sum();
    if skipped > 0 {
        debug!(
            shortform = canonical.as_str(),
            skipped, "ignored examples routed to other shortforms"
        );
    }
    fit_model(&canonical, &selected, aliases, config)
}

/// One model per canonical key present in `examples`. A key that fails
/// does not affect the others.
pub fn train_all(
    examples: &[TrainingExample],
    aliases: &AliasTable,
    config: &TrainingConfig,
) -> Result<BTreeMap<Shortform, Result<DisambiguationModel, TrainingError>>, TrainingError> {
    config.validate()?;
    let groups = group_by_canonical(examples, aliases)?;
    Ok(groups
        .into_iter()
        .map(|(canonical, group)| {
            let model = fit_model(&canonical, &group, aliases, config);
            (canonical, model)
        })
        .collect())
}

fn fit_model(
    canonical: &Shortform,
    examples: &[&TrainingExample],
    aliases: &AliasTable,
    config: &TrainingConfig,
) -> Result<DisambiguationModel, TrainingError> {
    let mut class_counts: BTreeMap<GroundingId, usize> = BTreeMap::new();
    for example in examples {
        *class_counts.entry(example.label.clone()).or_insert(0) += 1;
    }

    let groundings: Vec<GroundingId> = class_counts
        .iter()
        .filter(|(id, &n)| n >= config.min_examples_per_class && !id.is_ungrounded())
        .map(|(id, _)| id.clone())
        .collect();
    if groundings.len() < 2 {
        warn!(
            shortform = canonical.as_str(),
            counts = %format_counts(&class_counts),
            "insufficient data to train disambiguator"
        );
        return Err(TrainingError::InsufficientData {
            shortform: canonical.clone(),
            counts: class_counts,
            min_per_class: config.min_examples_per_class,
        });
    }

    let class_of: BTreeMap<&GroundingId, usize> =
        groundings.iter().enumerate().map(|(i, g)| (g, i)).collect();
    let (contexts, labels): (Vec<&[String]>, Vec<usize>) = examples
        .iter()
        .filter_map(|e| class_of.get(&e.label).map(|&c| (e.context.as_slice(), c)))
        .unzip();
    let n_classes = groundings.len();

    let search = cross_validate(&contexts, &labels, n_classes, config);

    let vocabulary = Vocabulary::fit(&contexts, &labels, n_classes, config.vocabulary_size);
    let x: Vec<_> = contexts.iter().map(|c| vocabulary.transform(c)).collect();
    let classifier = LinearClassifier::fit(
        &x,
        &labels,
        n_classes,
        vocabulary.len(),
        &FitParams::from_config(search.regularization, config),
    )
    .with_temperature(search.temperature);

    info!(
        shortform = canonical.as_str(),
        examples = labels.len(),
        groundings = n_classes,
        vocabulary = vocabulary.len(),
        regularization = search.regularization,
        cv_macro_f1 = search.macro_f1,
        temperature = search.temperature,
        "trained disambiguator"
    );

    let stats = TrainingStats {
        class_counts,
        regularization: search.regularization,
        cv_macro_f1: search.macro_f1,
        temperature: search.temperature,
        folds: search.folds,
    };
    let routed: BTreeSet<Shortform> = aliases.aliases_of(canonical.as_str());
    Ok(DisambiguationModel::from_parts(
        canonical.clone(),
        routed,
        groundings,
        vocabulary,
        classifier,
        stats,
    ))
}

struct SearchOutcome {
    regularization: f64,
    macro_f1: f64,
    temperature: f64,
    folds: usize,
}

/// Stratified k-fold search over the regularization grid.
///
/// Every `(C, fold)` pair is an independent job on the rayon pool; each job
/// fits its own vocabulary on the training part of the split. The best C
/// is the first in grid order with the highest out-of-fold macro-F1, and
/// the calibration temperature is fitted on that C's out-of-fold scores.
fn cross_validate(
    contexts: &[&[String]],
    labels: &[usize],
    n_classes: usize,
    config: &TrainingConfig,
) -> SearchOutcome {
    let mut class_sizes = vec![0usize; n_classes];
    for &label in labels {
        class_sizes[label] += 1;
    }
    let k = effective_folds(config.folds, &class_sizes);
    let assignment = stratified_folds(labels, n_classes, k, config.seed);

    let jobs: Vec<(usize, usize)> = (0..config.regularization_grid.len())
        .flat_map(|g| (0..k).map(move |fold| (g, fold)))
        .collect();

    let results: Vec<(usize, Vec<(usize, Vec<f64>)>)> = jobs
        .par_iter()
        .map(|&(g, fold)| {
            let c = config.regularization_grid[g];
            let (train, test): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| assignment[i] != fold);

            let train_contexts: Vec<&[String]> = train.iter().map(|&i| contexts[i]).collect();
            let train_labels: Vec<usize> = train.iter().map(|&i| labels[i]).collect();
            let vocabulary =
                Vocabulary::fit(&train_contexts, &train_labels, n_classes, config.vocabulary_size);
            let x: Vec<_> = train_contexts.iter().map(|c| vocabulary.transform(c)).collect();
            let classifier = LinearClassifier::fit(
                &x,
                &train_labels,
                n_classes,
                vocabulary.len(),
                &FitParams::from_config(c, config),
            );

            let scored: Vec<(usize, Vec<f64>)> = test
                .iter()
                .map(|&i| (i, classifier.scores(&vocabulary.transform(contexts[i]))))
                .collect();
            (g, scored)
        })
        .collect();

    let mut out_of_fold: Vec<Vec<Vec<f64>>> =
        vec![vec![Vec::new(); labels.len()]; config.regularization_grid.len()];
    for (g, scored) in results {
        for (i, scores) in scored {
            out_of_fold[g][i] = scores;
        }
    }

    let mut best = 0;
    let mut best_f1 = f64::NEG_INFINITY;
    for (g, scores) in out_of_fold.iter().enumerate() {
        let predicted: Vec<usize> = scores.iter().map(|s| argmax(s)).collect();
        let f1 = macro_f1(&predicted, labels, n_classes);
        debug!(c = config.regularization_grid[g], macro_f1 = f1, "cross-validated");
        if f1 > best_f1 {
            best = g;
            best_f1 = f1;
        }
    }

    SearchOutcome {
        regularization: config.regularization_grid[best],
        macro_f1: best_f1,
        temperature: fit_temperature(&out_of_fold[best], labels),
        folds: k,
    }
}
