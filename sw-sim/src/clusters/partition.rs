use super::utils::uf_bonds;
use crate::error::{Result, SamplerError};
use crate::geometry::Lattice;
use crate::state::BondFlags;

/// Sites split into disjoint clusters.
///
/// Stored compactly: cluster `c` holds `members[offsets[c]..offsets[c + 1]]`.
/// Clusters produced by [`find_clusters`] are ordered by their smallest site
/// index and list members in ascending order, so the ordering depends only
/// on the bond configuration and never on union-find root choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    offsets: Vec<usize>,
    members: Vec<usize>,
}

impl Partition {
    /// Build a partition from explicit member lists. No checks are made here;
    /// see [`Partition::validate`].
    pub fn from_clusters(clusters: Vec<Vec<usize>>) -> Self {
        let mut offsets = Vec::with_capacity(clusters.len() + 1);
        offsets.push(0);
        let mut members = Vec::new();
        for c in clusters {
            members.extend(c);
            offsets.push(members.len());
        }
        Self { offsets, members }
    }

    /// Number of clusters, singletons included.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn cluster(&self, c: usize) -> &[usize] {
        &self.members[self.offsets[c]..self.offsets[c + 1]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |c| self.cluster(c))
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.windows(2).map(|w| w[1] - w[0])
    }

    pub fn largest(&self) -> usize {
        self.sizes().max().unwrap_or(0)
    }

    /// Add the cluster-size histogram into `hist` (`hist[s] += 1` for each
    /// cluster of size `s`). `hist` needs at least `n_sites + 1` entries.
    pub fn size_histogram(&self, hist: &mut [u64]) -> Result<()> {
        let needed = self.members.len() + 1;
        if hist.len() < needed {
            return Err(SamplerError::InvalidRunConfig(format!(
                "cluster-size histogram has {} entries, needs {needed}",
                hist.len()
            )));
        }
        for s in self.sizes() {
            hist[s] += 1;
        }
        Ok(())
    }

    /// Check that this is a partition of `0..n_sites`: at least one cluster,
    /// no empty cluster, every site present exactly once.
    pub fn validate(&self, n_sites: usize) -> Result<()> {
        if self.is_empty() {
            return Err(SamplerError::InvalidPartition("no clusters".into()));
        }
        if let Some(c) = self.sizes().position(|s| s == 0) {
            return Err(SamplerError::InvalidPartition(format!("cluster {c} is empty")));
        }
        let mut seen = vec![false; n_sites];
        for &site in &self.members {
            match seen.get_mut(site) {
                None => {
                    return Err(SamplerError::InvalidPartition(format!(
                        "site {site} is outside the lattice"
                    )))
                }
                Some(true) => {
                    return Err(SamplerError::InvalidPartition(format!(
                        "site {site} appears in more than one cluster"
                    )))
                }
                Some(s) => *s = true,
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(SamplerError::InvalidPartition(format!(
                "site {missing} is not in any cluster"
            )));
        }
        Ok(())
    }
}

/// Connected components of the graph whose edges are the active bonds.
///
/// Every site is in exactly one cluster; sites with no active bond form
/// singletons. Runs in `O(N α(N))`.
pub fn find_clusters(lattice: &Lattice, bonds: &BondFlags) -> Partition {
    let n_sites = lattice.n_sites;
    let roots = uf_bonds(lattice, bonds);

    // Number clusters by first appearance in row-major order.
    let mut id_of_root = vec![u32::MAX; n_sites];
    let mut cluster_of = vec![0u32; n_sites];
    let mut n_clusters = 0u32;
    for i in 0..n_sites {
        let r = roots[i] as usize;
        if id_of_root[r] == u32::MAX {
            id_of_root[r] = n_clusters;
            n_clusters += 1;
        }
        cluster_of[i] = id_of_root[r];
    }

    // Counting sort of sites by cluster id.
    let mut offsets = vec![0usize; n_clusters as usize + 1];
    for &c in &cluster_of {
        offsets[c as usize + 1] += 1;
    }
    for c in 0..n_clusters as usize {
        offsets[c + 1] += offsets[c];
    }
    let mut cursor = offsets.clone();
    let mut members = vec![0usize; n_sites];
    for (i, &c) in cluster_of.iter().enumerate() {
        members[cursor[c as usize]] = i;
        cursor[c as usize] += 1;
    }

    let partition = Partition { offsets, members };
    debug_assert!(partition.validate(n_sites).is_ok());
    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bonds_gives_singletons() {
        let lattice = Lattice::new(3, 4).unwrap();
        let p = find_clusters(&lattice, &BondFlags::inactive(&lattice));
        assert_eq!(p.len(), 12);
        assert!(p.sizes().all(|s| s == 1));
        assert_eq!(p.cluster(5), &[5]);
    }

    #[test]
    fn test_all_bonds_gives_one_cluster() {
        let lattice = Lattice::new(5, 6).unwrap();
        let bonds = BondFlags::from_fn(&lattice, |_, _, _| true);
        let p = find_clusters(&lattice, &bonds);
        assert_eq!(p.len(), 1);
        assert_eq!(p.cluster(0), (0..30).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_ordering_by_smallest_member() {
        // 3x3, flat = x * 3 + y. Active: 2-5, 5-8, 0-3
        let lattice = Lattice::new(3, 3).unwrap();
        let bonds = BondFlags::from_fn(&lattice, |_, i, j| {
            matches!((i, j), (2, 5) | (5, 8) | (0, 3))
        });
        let p = find_clusters(&lattice, &bonds);
        let clusters: Vec<&[usize]> = p.iter().collect();
        assert_eq!(
            clusters,
            vec![&[0, 3][..], &[1][..], &[2, 5, 8][..], &[4][..], &[6][..], &[7][..]]
        );
        assert_eq!(p.largest(), 3);
    }

    #[test]
    fn test_chain_lattice() {
        // 1x6 chain: only down bonds exist. Active: 0-1, 1-2, 4-5
        let lattice = Lattice::new(1, 6).unwrap();
        let bonds = BondFlags::from_fn(&lattice, |_, i, _| i != 2 && i != 3);
        let p = find_clusters(&lattice, &bonds);
        let clusters: Vec<&[usize]> = p.iter().collect();
        assert_eq!(clusters, vec![&[0, 1, 2][..], &[3][..], &[4, 5][..]]);
        assert!(p.validate(6).is_ok());
    }

    #[test]
    fn test_size_histogram() {
        let lattice = Lattice::new(1, 6).unwrap();
        let bonds = BondFlags::from_fn(&lattice, |_, i, _| i != 2 && i != 3);
        let p = find_clusters(&lattice, &bonds);
        let mut hist = vec![0u64; 7];
        p.size_histogram(&mut hist).unwrap();
        assert_eq!(hist, vec![0, 1, 1, 1, 0, 0, 0]);

        let mut short = vec![0u64; 6];
        assert!(matches!(
            p.size_histogram(&mut short),
            Err(SamplerError::InvalidRunConfig(_))
        ));
        assert_eq!(short, vec![0; 6]);
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let bad = |p: Partition| matches!(p.validate(3), Err(SamplerError::InvalidPartition(_)));
        assert!(bad(Partition::from_clusters(vec![])));
        assert!(bad(Partition::from_clusters(vec![vec![0, 1, 2], vec![]])));
        assert!(bad(Partition::from_clusters(vec![vec![0, 1], vec![1, 2]])));
        assert!(bad(Partition::from_clusters(vec![vec![0, 1]])));
        assert!(bad(Partition::from_clusters(vec![vec![0, 1, 2, 3]])));
        assert!(Partition::from_clusters(vec![vec![2], vec![0, 1]])
            .validate(3)
            .is_ok());
    }
}
