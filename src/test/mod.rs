
pub(crate) use brute::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Route `log` records to the test output when `RUST_LOG` is set.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A reproducible cloud of `n` points uniformly spread over `[-range, range)` on every axis.
pub(crate) fn random_points<const K: usize>(seed: u64, n: usize, range: f64) -> Vec<[f64; K]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| std::array::from_fn(|_| rng.gen_range(-range..range)))
        .collect()
}

/// Integer points on a small grid, so duplicates and distance ties are frequent.
pub(crate) fn random_grid_points<const K: usize>(seed: u64, n: usize, side: i32) -> Vec<[i32; K]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| std::array::from_fn(|_| rng.gen_range(0..side)))
        .collect()
}
