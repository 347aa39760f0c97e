use rand::seq::index;
use rand::Rng;

/// Uniform draws consumed by the sampler.
///
/// Every `rand::Rng` is a `RandomSource`, so a seeded `Xoshiro256StarStar`
/// gives reproducible runs. The sampler only relies on the statistical
/// contract of each method, never on the underlying generator.
pub trait RandomSource {
    /// Uniform real in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `lo..=hi`. Requires `lo <= hi`.
    fn uniform_int(&mut self, lo: usize, hi: usize) -> usize;

    /// `amount` distinct indices from `0..length`, chosen uniformly without
    /// replacement, in draw order. Requires `amount <= length`.
    fn choose_distinct(&mut self, length: usize, amount: usize) -> Vec<usize>;

    /// Raw 64-bit draw, used to seed per-row generators.
    fn next_seed(&mut self) -> u64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    #[inline]
    fn uniform_int(&mut self, lo: usize, hi: usize) -> usize {
        self.gen_range(lo..=hi)
    }

    fn choose_distinct(&mut self, length: usize, amount: usize) -> Vec<usize> {
        index::sample(self, length, amount).into_vec()
    }

    #[inline]
    fn next_seed(&mut self) -> u64 {
        self.next_u64()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use std::collections::HashSet;

    #[test]
    fn test_uniform_int_is_inclusive() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let seen: HashSet<usize> = (0..500).map(|_| rng.uniform_int(1, 3)).collect();
        assert_eq!(seen, [1, 2, 3].into_iter().collect());
    }

    #[test]
    fn test_choose_distinct_has_no_repeats() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        for amount in 0..=10 {
            let picked = rng.choose_distinct(10, amount);
            assert_eq!(picked.len(), amount);
            let unique: HashSet<usize> = picked.iter().copied().collect();
            assert_eq!(unique.len(), amount);
            assert!(picked.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        for _ in 0..1000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
