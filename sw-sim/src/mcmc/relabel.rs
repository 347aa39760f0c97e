use crate::clusters::Partition;
use crate::config::RelabelMode;
use crate::error::Result;
use crate::random::RandomSource;
use crate::state::LatticeState;

/// Give clusters of `partition` fresh labels drawn uniformly from the
/// state's alphabet. Every site of a chosen cluster receives the same label;
/// sites of unchosen clusters keep theirs.
///
/// With [`RelabelMode::Subset`], `m ~ UniformInt[1, k]` clusters are chosen
/// without replacement (`m = 1` when `k = 1`). With [`RelabelMode::All`],
/// every cluster draws a label, in partition order.
///
/// Returns the number of clusters relabelled. A malformed partition yields
/// [`SamplerError::InvalidPartition`](crate::SamplerError::InvalidPartition)
/// and leaves the state untouched.
pub fn relabel<R: RandomSource + ?Sized>(
    state: &mut LatticeState,
    partition: &Partition,
    mode: RelabelMode,
    rng: &mut R,
) -> Result<usize> {
    partition.validate(state.lattice().n_sites)?;

    let k = partition.len();
    let chosen: Vec<usize> = match mode {
        RelabelMode::Subset => {
            let m = rng.uniform_int(1, k);
            rng.choose_distinct(k, m)
        }
        RelabelMode::All => (0..k).collect(),
    };

    for &c in &chosen {
        let label = state.alphabet().draw(rng);
        for &site in partition.cluster(c) {
            state.set_flat(site, label);
        }
    }
    Ok(chosen.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::find_clusters;
    use crate::error::SamplerError;
    use crate::geometry::Lattice;
    use crate::random::testing::ScriptedSource;
    use crate::state::{Alphabet, BondFlags};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    fn potts_state(x: usize, y: usize, q: usize, seed: u64) -> LatticeState {
        let lattice = Lattice::new(x, y).unwrap();
        let alphabet = Alphabet::for_labels(q).unwrap();
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        LatticeState::random(lattice, alphabet, &mut rng)
    }

    #[test]
    fn test_single_cluster_recolors_whole_lattice() {
        let mut state = potts_state(6, 5, 4, 1);
        let partition = Partition::from_clusters(vec![(0..30).collect()]);
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let m = relabel(&mut state, &partition, RelabelMode::Subset, &mut rng).unwrap();
        assert_eq!(m, 1);
        let first = state.labels()[0];
        assert!(state.labels().iter().all(|&l| l == first));
    }

    #[test]
    fn test_cluster_uniform_relabel() {
        // Bonds ignore labels here, so clusters start out mixed and a
        // relabelled cluster is recognisable by becoming uniform.
        let mut rng = Xoshiro256StarStar::seed_from_u64(8);
        for trial in 0..50 {
            let mut state = potts_state(8, 8, 3, trial);
            let lattice = state.lattice().clone();
            let bonds = BondFlags::from_fn(&lattice, |_, _, _| rng.gen_bool(0.5));
            let partition = find_clusters(&lattice, &bonds);
            let before = state.labels().to_vec();

            let m = relabel(&mut state, &partition, RelabelMode::Subset, &mut rng).unwrap();
            assert!((1..=partition.len()).contains(&m));

            let after = state.labels();
            let mut changed = 0;
            for cluster in partition.iter() {
                let unchanged = cluster.iter().all(|&s| after[s] == before[s]);
                let uniform = cluster.iter().all(|&s| after[s] == after[cluster[0]]);
                assert!(unchanged || uniform);
                if !unchanged {
                    changed += 1;
                }
            }
            assert!(changed <= m);
        }
    }

    #[test]
    fn test_unchosen_clusters_keep_labels() {
        // Scripted draws: m = 1 and the chosen cluster is index 0.
        let mut state = potts_state(1, 4, 3, 3);
        let partition = Partition::from_clusters(vec![vec![0, 1], vec![2], vec![3]]);
        let before = state.labels().to_vec();
        let mut rng = ScriptedSource::constant(0.0);
        let m = relabel(&mut state, &partition, RelabelMode::Subset, &mut rng).unwrap();
        assert_eq!(m, 1);
        let alphabet_first = state.alphabet().values()[0];
        assert_eq!(state.labels()[0], alphabet_first);
        assert_eq!(state.labels()[1], alphabet_first);
        assert_eq!(&state.labels()[2..], &before[2..]);
    }

    #[test]
    fn test_all_mode_touches_every_cluster() {
        let mut state = potts_state(4, 4, 2, 4);
        let lattice = state.lattice().clone();
        let partition = find_clusters(&lattice, &BondFlags::inactive(&lattice));
        let mut rng = ScriptedSource::constant(0.0);
        let m = relabel(&mut state, &partition, RelabelMode::All, &mut rng).unwrap();
        assert_eq!(m, 16);
        // one label draw per cluster
        assert_eq!(rng.int_draws, 16);
        assert!(state.labels().iter().all(|&l| l == -1));
    }

    #[test]
    fn test_subset_size_covers_full_range() {
        let lattice = Lattice::new(1, 3).unwrap();
        let partition = find_clusters(&lattice, &BondFlags::inactive(&lattice));
        let mut rng = Xoshiro256StarStar::seed_from_u64(21);
        let mut seen = [false; 4];
        for t in 0..300 {
            let mut state = potts_state(1, 3, 2, t);
            let m = relabel(&mut state, &partition, RelabelMode::Subset, &mut rng).unwrap();
            seen[m] = true;
        }
        assert_eq!(seen, [false, true, true, true]);
    }

    #[test]
    fn test_invalid_partition_is_rejected() {
        let mut state = potts_state(2, 2, 2, 5);
        let before = state.clone();
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);

        for bad in [
            Partition::from_clusters(vec![]),
            Partition::from_clusters(vec![vec![0, 1, 2, 3], vec![]]),
            Partition::from_clusters(vec![vec![0, 1], vec![1, 2, 3]]),
        ] {
            let res = relabel(&mut state, &bad, RelabelMode::Subset, &mut rng);
            assert!(matches!(res, Err(SamplerError::InvalidPartition(_))));
            assert_eq!(state, before);
        }
    }
}
