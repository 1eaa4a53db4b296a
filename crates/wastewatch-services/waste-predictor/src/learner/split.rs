use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices for a shuffled train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded generator and hold out `ceil(n * test_ratio)` rows.
///
/// The held-out rows come first in the shuffled order. The ratio is clamped
/// to `[0, 1]`, and the same `(n, test_ratio, seed)` always yields the same split.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> TrainTestSplit {
    let ratio = if test_ratio.is_finite() {
        test_ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let n_test = ((n as f64 * ratio).ceil() as usize).min(n);

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(n_test);
    TrainTestSplit { train, test: order }
}

/// Gather rows by index.
pub fn take_rows<T: Clone>(data: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| data[i].clone()).collect()
}
