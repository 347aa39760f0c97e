/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Equal-label bonds entering the activation pass.
    pub active_before: usize,
    /// Bonds that survived activation.
    pub active_after: usize,
    /// Number of FK clusters, singletons included.
    pub n_clusters: usize,
    pub n_relabelled: usize,
    /// Size of the largest FK cluster.
    pub largest_cluster: usize,
}

/// Observables averaged over the measurement sweeps of a run.
///
/// Averages are zero when `n_measurements == 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepResult {
    /// ⟨E⟩, Potts energy per site.
    pub energy: f64,
    /// ⟨E²⟩.
    pub energy2: f64,
    /// ⟨m⟩, Potts order parameter.
    pub order: f64,
    /// ⟨m²⟩.
    pub order2: f64,
    /// ⟨m⁴⟩.
    pub order4: f64,
    /// Mean number of FK clusters per sweep.
    pub mean_clusters: f64,
    /// Mean size of the largest FK cluster as a fraction of the lattice.
    pub mean_largest_fraction: f64,
    /// Mean fraction of equal-label bonds that survived activation.
    pub mean_bond_survival: f64,
    /// FK cluster-size histogram summed over measurement sweeps:
    /// `csd[s]` = count of size-`s` clusters. Empty unless collected.
    pub csd: Vec<u64>,
    /// Normalized autocorrelation Γ(Δt) of m², length `max_lag + 1`.
    /// Empty unless requested.
    pub order2_autocorrelation: Vec<f64>,
    /// Integrated autocorrelation time of m², when requested.
    pub order2_tau: Option<f64>,
    pub n_measurements: usize,
}

impl SweepResult {
    /// Average [`SweepResult`]s across independent chains.
    ///
    /// Scalar observables and autocorrelations are averaged, histograms and
    /// measurement counts are summed.
    pub fn aggregate(results: &[Self]) -> Self {
        let Some(first) = results.first() else {
            return Self::default();
        };
        let n = results.len() as f64;

        let mut agg = SweepResult {
            csd: vec![0u64; first.csd.len()],
            order2_autocorrelation: vec![0.0; first.order2_autocorrelation.len()],
            ..Self::default()
        };

        for r in results {
            agg.energy += r.energy;
            agg.energy2 += r.energy2;
            agg.order += r.order;
            agg.order2 += r.order2;
            agg.order4 += r.order4;
            agg.mean_clusters += r.mean_clusters;
            agg.mean_largest_fraction += r.mean_largest_fraction;
            agg.mean_bond_survival += r.mean_bond_survival;
            agg.n_measurements += r.n_measurements;
            for (a, &h) in agg.csd.iter_mut().zip(r.csd.iter()) {
                *a += h;
            }
            for (a, &g) in agg
                .order2_autocorrelation
                .iter_mut()
                .zip(r.order2_autocorrelation.iter())
            {
                *a += g;
            }
        }

        for v in [
            &mut agg.energy,
            &mut agg.energy2,
            &mut agg.order,
            &mut agg.order2,
            &mut agg.order4,
            &mut agg.mean_clusters,
            &mut agg.mean_largest_fraction,
            &mut agg.mean_bond_survival,
        ] {
            *v /= n;
        }
        for g in agg.order2_autocorrelation.iter_mut() {
            *g /= n;
        }

        let taus: Vec<f64> = results.iter().filter_map(|r| r.order2_tau).collect();
        if !taus.is_empty() {
            agg.order2_tau = Some(taus.iter().sum::<f64>() / taus.len() as f64);
        }

        agg
    }

    /// Binder cumulant `1 - ⟨m⁴⟩ / (3 ⟨m²⟩²)`.
    pub fn binder_cumulant(&self) -> f64 {
        if self.order2 == 0.0 {
            return 0.0;
        }
        1.0 - self.order4 / (3.0 * self.order2 * self.order2)
    }
}
