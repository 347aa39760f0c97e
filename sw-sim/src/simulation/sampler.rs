use crate::clusters::find_clusters;
use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::geometry::Lattice;
use crate::mcmc::bonds::{self, activation_probability};
use crate::mcmc::relabel::relabel;
use crate::random::RandomSource;
use crate::state::{BondFlags, LatticeState, Snapshot};
use crate::statistics::SweepStats;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, trace};

/// One Swendsen-Wang Markov chain: the lattice labels, the bond flags carried
/// from one sweep to the next, and the chain's random source.
///
/// Each [`sweep`](Sampler::sweep) runs, in this order and without skipping:
/// 1. bond activation on the flags left by the previous sweep's refresh
///    (or by the initial derivation),
/// 2. cluster discovery over the surviving bonds,
/// 3. relabelling of clusters,
/// 4. bond refresh from the new labels, kept for the next sweep.
#[derive(Debug, Clone)]
pub struct Sampler<R = Xoshiro256StarStar> {
    config: SamplerConfig,
    state: LatticeState,
    bonds: BondFlags,
    q: f64,
    rng: R,
    sweeps_done: usize,
}

impl Sampler<Xoshiro256StarStar> {
    /// Build a chain seeded from `config.seed`.
    pub fn new(config: SamplerConfig) -> Result<Self> {
        let rng = Xoshiro256StarStar::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Sampler<R> {
    /// Build a chain drawing from `rng`. Initial labels are i.i.d. uniform.
    pub fn with_rng(config: SamplerConfig, mut rng: R) -> Result<Self> {
        config.check()?;
        let lattice = Lattice::new(config.x_range, config.y_range)?;
        let alphabet = config.alphabet()?;
        let state = LatticeState::random(lattice, alphabet, &mut rng);
        Self::from_state(config, state, rng)
    }

    /// Continue a chain from an existing state. The state must match the
    /// configured dimensions and alphabet size.
    pub fn from_state(config: SamplerConfig, state: LatticeState, rng: R) -> Result<Self> {
        config.check()?;
        let lattice = state.lattice();
        if lattice.x_range != config.x_range || lattice.y_range != config.y_range {
            return Err(SamplerError::InvalidDimension {
                x_range: lattice.x_range,
                y_range: lattice.y_range,
            });
        }
        if state.alphabet().len() != config.labels {
            return Err(SamplerError::InvalidAlphabet(format!(
                "state has {} labels, config expects {}",
                state.alphabet().len(),
                config.labels
            )));
        }

        let bonds = state.derive_bonds();
        let q = activation_probability(config.beta);
        debug!(
            x_range = config.x_range,
            y_range = config.y_range,
            labels = config.labels,
            beta = config.beta,
            q,
            "sampler initialized"
        );

        Ok(Self {
            config,
            state,
            bonds,
            q,
            rng,
            sweeps_done: 0,
        })
    }

    /// Run one full sweep.
    pub fn sweep(&mut self) -> Result<SweepStats> {
        self.sweep_with_csd(None)
    }

    /// Run one full sweep, adding the FK cluster-size histogram into `csd`
    /// (length `n_sites + 1`) when given.
    ///
    /// A `csd` shorter than `n_sites + 1` is rejected before any state
    /// changes. An `InvalidPartition` error means the chain is no longer
    /// sampling a defined distribution; the caller must stop using this
    /// sampler.
    pub fn sweep_with_csd(&mut self, csd: Option<&mut [u64]>) -> Result<SweepStats> {
        let n_sites = self.state.lattice().n_sites;
        if let Some(hist) = csd.as_deref() {
            if hist.len() <= n_sites {
                return Err(SamplerError::InvalidRunConfig(format!(
                    "cluster-size histogram has {} entries, needs {}",
                    hist.len(),
                    n_sites + 1
                )));
            }
        }

        let activation = if self.config.sequential {
            bonds::activate_in_place(&mut self.bonds, self.q, &mut self.rng)
        } else {
            let sweep_seed = self.rng.next_seed();
            let y_range = self.state.lattice().y_range;
            bonds::activate_by_row(&mut self.bonds, y_range, self.q, sweep_seed, false)
        };

        let partition = find_clusters(self.state.lattice(), &self.bonds);
        if let Some(hist) = csd {
            partition.size_histogram(hist)?;
        }

        let n_relabelled = relabel(
            &mut self.state,
            &partition,
            self.config.relabel_mode,
            &mut self.rng,
        )?;

        self.state.derive_bonds_into(&mut self.bonds);
        self.sweeps_done += 1;

        let stats = SweepStats {
            active_before: activation.examined,
            active_after: activation.kept,
            n_clusters: partition.len(),
            n_relabelled,
            largest_cluster: partition.largest(),
        };
        trace!(
            sweep = self.sweeps_done,
            q = self.q,
            examined = activation.examined,
            kept = activation.kept,
            dropped = activation.dropped(),
            clusters = stats.n_clusters,
            relabelled = n_relabelled,
            "sweep"
        );
        Ok(stats)
    }

    pub fn state(&self) -> &LatticeState {
        &self.state
    }

    /// Bond flags as of the last refresh: equal-label neighbors are active.
    pub fn bonds(&self) -> &BondFlags {
        &self.bonds
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.state.snapshot()
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Bond activation probability `1 - exp(-beta)`.
    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn sweeps_done(&self) -> usize {
        self.sweeps_done
    }

    pub fn into_state(self) -> LatticeState {
        self.state
    }
}
