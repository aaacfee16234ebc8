use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Assign each example to one of `k` folds so every class is spread as
/// evenly as possible across folds.
///
/// Within each class, examples are shuffled with a `ChaCha8Rng` seeded
/// from `seed` and dealt round-robin. The same labels and seed always give
/// the same assignment.
pub fn stratified_folds(labels: &[usize], n_classes: usize, k: usize, seed: u64) -> Vec<usize> {
    let k = k.max(1);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        by_class[label].push(i);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut assignment = vec![0; labels.len()];
    // Continue dealing where the previous class stopped, so small classes
    // do not all pile into fold 0.
    let mut next = 0;
    for members in by_class.iter_mut() {
        members.shuffle(&mut rng);
        for &i in members.iter() {
            assignment[i] = next % k;
            next += 1;
        }
    }
    assignment
}

/// Number of folds usable for the given class counts: at most `requested`,
/// at most the smallest class size, and never below two.
pub fn effective_folds(requested: usize, class_counts: &[usize]) -> usize {
    let smallest = class_counts.iter().copied().min().unwrap_or(0);
    requested.min(smallest).max(2)
}
