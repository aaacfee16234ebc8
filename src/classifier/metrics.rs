/// Numerically stable softmax. An empty input gives an empty output.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the lowest index wins ties.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Mean negative log-likelihood of the true labels.
pub fn log_loss(probabilities: &[Vec<f64>], labels: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = probabilities
        .iter()
        .zip(labels)
        .map(|(p, &y)| -p[y].max(1e-15).ln())
        .sum();
    total / labels.len() as f64
}

/// Unweighted mean of per-class F1 over the classes that occur in either
/// the gold labels or the predictions.
pub fn macro_f1(predicted: &[usize], gold: &[usize], n_classes: usize) -> f64 {
    let mut tp = vec![0usize; n_classes];
    let mut fp = vec![0usize; n_classes];
    let mut fn_ = vec![0usize; n_classes];
    for (&p, &g) in predicted.iter().zip(gold) {
        if p == g {
            tp[p] += 1;
        } else {
            fp[p] += 1;
            fn_[g] += 1;
        }
    }

    let mut sum = 0.0;
    let mut seen = 0;
    for k in 0..n_classes {
        let support = tp[k] + fp[k] + fn_[k];
        if support == 0 {
            continue;
        }
        seen += 1;
        sum += 2.0 * tp[k] as f64 / (2 * tp[k] + fp[k] + fn_[k]) as f64;
    }
    if seen == 0 {
        0.0
    } else {
        sum / seen as f64
    }
}
