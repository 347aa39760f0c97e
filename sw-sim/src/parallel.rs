use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;

/// Dispatch a per-row closure over the bond flags of each lattice row,
/// optionally in parallel.
///
/// `flags` is split into consecutive chunks of `row_len` slots. Row `x` gets
/// its own generator seeded from `base_seed + x`, so the draws a bond sees
/// depend only on its row and position, never on thread scheduling.
///
/// When `sequential` is true, rows are processed on the current thread (no
/// rayon overhead, best for small lattices or when chains already run in
/// parallel).
pub fn par_over_rows<T: Send>(
    flags: &mut [bool],
    row_len: usize,
    base_seed: u64,
    sequential: bool,
    body: impl Fn(usize, &mut [bool], &mut Xoshiro256StarStar) -> T + Send + Sync,
) -> Vec<T> {
    let work = |(x, row): (usize, &mut [bool])| {
        let mut rng = Xoshiro256StarStar::seed_from_u64(base_seed.wrapping_add(x as u64));
        body(x, row, &mut rng)
    };

    if sequential {
        flags.chunks_mut(row_len).enumerate().map(work).collect()
    } else {
        flags.par_chunks_mut(row_len).enumerate().map(work).collect()
    }
}
