use crate::geometry::N_DIRS;
use crate::parallel::par_over_rows;
use crate::random::RandomSource;
use crate::state::BondFlags;

/// Fortuin-Kasteleyn activation probability `q = 1 - exp(-beta)`.
#[inline]
pub fn activation_probability(beta: f64) -> f64 {
    -(-beta).exp_m1()
}

/// How many equal-label bonds were examined and how many stayed active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation {
    pub examined: usize,
    pub kept: usize,
}

impl Activation {
    pub fn dropped(&self) -> usize {
        self.examined - self.kept
    }
}

/// Probabilistic bond pass: returns new flags where each currently active
/// bond stays active with probability `1 - exp(-beta)`.
///
/// Inactive bonds stay inactive. Exactly one uniform draw is taken per
/// active bond, in slot order (row-major sites, down before right).
pub fn activate<R: RandomSource + ?Sized>(bonds: &BondFlags, beta: f64, rng: &mut R) -> BondFlags {
    let mut next = bonds.clone();
    activate_in_place(&mut next, activation_probability(beta), rng);
    next
}

/// In-place form of [`activate`] taking the probability `q` directly.
pub fn activate_in_place<R: RandomSource + ?Sized>(
    bonds: &mut BondFlags,
    q: f64,
    rng: &mut R,
) -> Activation {
    activate_slice(bonds.as_mut_slice(), q, rng)
}

/// Row-seeded variant of [`activate_in_place`] that can run rows on rayon.
///
/// Row `x` draws from a generator seeded with `sweep_seed + x`, one draw per
/// active bond in slot order within the row. The result is identical for
/// `sequential = true` and `false`; it differs from the single-stream pass.
pub fn activate_by_row(
    bonds: &mut BondFlags,
    y_range: usize,
    q: f64,
    sweep_seed: u64,
    sequential: bool,
) -> Activation {
    let per_row = par_over_rows(
        bonds.as_mut_slice(),
        y_range * N_DIRS,
        sweep_seed,
        sequential,
        |_, row, rng| activate_slice(row, q, rng),
    );
    per_row
        .into_iter()
        .fold(Activation::default(), |acc, a| Activation {
            examined: acc.examined + a.examined,
            kept: acc.kept + a.kept,
        })
}

#[inline]
fn activate_slice<R: RandomSource + ?Sized>(
    flags: &mut [bool],
    q: f64,
    rng: &mut R,
) -> Activation {
    let mut counts = Activation::default();
    for flag in flags.iter_mut().filter(|f| **f) {
        counts.examined += 1;
        *flag = rng.uniform() < q;
        counts.kept += usize::from(*flag);
    }
    counts
}
