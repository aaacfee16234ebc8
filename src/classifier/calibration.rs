use super::metrics::{log_loss, softmax};

/// Temperatures tried: `10^(k/20)` for `k` in `-26..=26`, i.e. roughly
/// 0.05 to 20, including exactly 1.
fn temperature_grid() -> impl Iterator<Item = f64> {
    (-26..=26).map(|k| 10f64.powf(k as f64 / 20.0))
}

/// Temperature minimizing the log-loss of `softmax(scores / T)` on
/// held-out scores. The first (smallest) temperature wins ties; with no
/// scores the identity temperature is returned.
pub fn fit_temperature(scores: &[Vec<f64>], labels: &[usize]) -> f64 {
    if scores.is_empty() {
        return 1.0;
    }
    let mut best = (1.0, f64::INFINITY);
    for t in temperature_grid() {
        let probabilities: Vec<Vec<f64>> = scores
            .iter()
            .map(|s| softmax(&s.iter().map(|v| v / t).collect::<Vec<_>>()))
            .collect();
        let loss = log_loss(&probabilities, labels);
        if loss < best.1 {
            best = (t, loss);
        }
    }
    best.0
}
