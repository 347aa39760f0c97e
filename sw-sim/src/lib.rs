pub mod clusters;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod random;
pub mod simulation;
pub mod state;
pub mod statistics;

mod parallel;

pub use clusters::{find_clusters, Partition};
pub use config::{RelabelMode, RunConfig, SamplerConfig};
pub use error::{Result, SamplerError};
pub use geometry::{BondDir, Lattice, Site};
pub use random::RandomSource;
pub use simulation::{run_chains_parallel, run_sweep_loop, Sampler};
pub use state::{Alphabet, BondFlags, Label, LatticeState, Snapshot};
pub use statistics::{SweepResult, SweepStats};
