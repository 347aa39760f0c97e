pub mod sampler;

pub use sampler::Sampler;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{RunConfig, SamplerConfig};
use crate::error::{Result, SamplerError};
use crate::random::RandomSource;
use crate::state::Snapshot;
use crate::statistics::{sokal_tau, AutocorrAccum, Statistics, SweepResult};
use rayon::prelude::*;
use tracing::{info, warn};

/// Run warmup and measurement sweeps on one chain.
///
/// After `warmup_sweeps`, every sweep records the Potts energy and order
/// parameter, cluster counts, and optionally the FK cluster-size histogram
/// and the autocorrelation of m².
///
/// When every sweep is warmup the result has `n_measurements == 0`, zeroed
/// averages and no autocorrelation.
///
/// `on_sweep(sweep_id, snapshot)` is called after every completed sweep and
/// must not retain the snapshot past the call. `interrupted` is checked
/// between sweeps only; a sweep in progress always completes.
pub fn run_sweep_loop<R: RandomSource>(
    sampler: &mut Sampler<R>,
    config: &RunConfig,
    interrupted: &AtomicBool,
    on_sweep: &(dyn Fn(usize, Snapshot<'_>) + Sync),
) -> Result<SweepResult> {
    config.checked()?;

    let n_sites = sampler.state().lattice().n_sites;
    let n_sweeps = config.n_sweeps;
    let warmup_sweeps = config.warmup_sweeps;
    let n_measurement_sweeps = n_sweeps - warmup_sweeps;

    let mut energy_stat = Statistics::new(1);
    let mut energy2_stat = Statistics::new(2);
    let mut order_stat = Statistics::new(1);
    let mut order2_stat = Statistics::new(2);
    let mut order4_stat = Statistics::new(4);
    let mut clusters_stat = Statistics::new(1);
    let mut largest_stat = Statistics::new(1);
    let mut survival_stat = Statistics::new(1);

    let mut csd = if config.collect_csd {
        vec![0u64; n_sites + 1]
    } else {
        vec![]
    };

    if n_measurement_sweeps == 0 {
        warn!(n_sweeps, warmup_sweeps, "every sweep is warmup, nothing will be measured");
    }
    let ac_max_lag = config
        .autocorrelation_max_lag
        .filter(|_| n_measurement_sweeps > 0)
        .map(|k| k.min(n_measurement_sweeps / 4).max(1));
    let mut m2_accum = ac_max_lag.map(AutocorrAccum::new);

    for sweep_id in 0..n_sweeps {
        if interrupted.load(Ordering::Relaxed) {
            return Err(SamplerError::Interrupted);
        }
        let record = sweep_id >= warmup_sweeps;

        let csd_out = if config.collect_csd && record {
            Some(csd.as_mut_slice())
        } else {
            None
        };
        let stats = sampler.sweep_with_csd(csd_out)?;
        on_sweep(sweep_id, sampler.snapshot());

        if record {
            let state = sampler.state();
            let energy = state.energy_per_site();
            let m = state.order_parameter();

            energy_stat.update(energy);
            energy2_stat.update(energy);
            order_stat.update(m);
            order2_stat.update(m);
            order4_stat.update(m);
            clusters_stat.update(stats.n_clusters as f64);
            largest_stat.update(stats.largest_cluster as f64 / n_sites as f64);
            if stats.active_before > 0 {
                survival_stat.update(stats.active_after as f64 / stats.active_before as f64);
            }
            if let Some(ref mut acc) = m2_accum {
                acc.push(m * m);
            }
        }
    }

    let order2_autocorrelation = m2_accum.map(|acc| acc.finish()).unwrap_or_default();
    let order2_tau = (!order2_autocorrelation.is_empty()).then(|| sokal_tau(&order2_autocorrelation));

    Ok(SweepResult {
        energy: energy_stat.average(),
        energy2: energy2_stat.average(),
        order: order_stat.average(),
        order2: order2_stat.average(),
        order4: order4_stat.average(),
        mean_clusters: clusters_stat.average(),
        mean_largest_fraction: largest_stat.average(),
        mean_bond_survival: survival_stat.average(),
        csd,
        order2_autocorrelation,
        order2_tau,
        n_measurements: n_measurement_sweeps,
    })
}

/// Run `n_chains` independent chains in parallel and average their results.
///
/// Chain `c` is seeded with `config.seed + c`. For a single chain the loop is
/// called directly, skipping rayon thread-pool overhead. `on_sweep` may be
/// called concurrently from several chains.
pub fn run_chains_parallel(
    config: &SamplerConfig,
    n_chains: usize,
    run_config: &RunConfig,
    interrupted: &AtomicBool,
    on_sweep: &(dyn Fn(usize, Snapshot<'_>) + Sync),
) -> Result<SweepResult> {
    if n_chains == 0 {
        return Err(SamplerError::InvalidRunConfig(
            "n_chains must be >= 1".to_string(),
        ));
    }

    let mut samplers = (0..n_chains)
        .map(|c| {
            Sampler::new(SamplerConfig {
                seed: config.seed.wrapping_add(c as u64),
                ..config.clone()
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        n_chains,
        n_sweeps = run_config.n_sweeps,
        x_range = config.x_range,
        y_range = config.y_range,
        "starting chains"
    );

    if n_chains == 1 {
        return run_sweep_loop(&mut samplers[0], run_config, interrupted, on_sweep);
    }

    let results: Vec<Result<SweepResult>> = samplers
        .par_iter_mut()
        .map(|sampler| run_sweep_loop(sampler, run_config, interrupted, on_sweep))
        .collect();

    let results: Vec<SweepResult> = results.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(SweepResult::aggregate(&results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn small_config() -> SamplerConfig {
        SamplerConfig {
            labels: 3,
            beta: 1.0,
            ..SamplerConfig::new(8, 8)
        }
    }

    #[test]
    fn test_loop_calls_back_every_sweep() {
        let mut sampler = Sampler::new(small_config()).unwrap();
        let calls = AtomicUsize::new(0);
        let interrupted = AtomicBool::new(false);
        let run = RunConfig {
            warmup_sweeps: 5,
            ..RunConfig::new(25)
        };
        let result = run_sweep_loop(&mut sampler, &run, &interrupted, &|id, snap| {
            assert_eq!(snap.x_range(), 8);
            assert_eq!(id, calls.fetch_add(1, Ordering::Relaxed));
        })
        .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 25);
        assert_eq!(sampler.sweeps_done(), 25);
        assert_eq!(result.n_measurements, 20);
        assert!(result.energy <= 0.0 && result.energy >= -2.0);
        assert!((0.0..=1.0).contains(&result.order));
        assert!(result.order2 <= result.order + 1e-12);
        assert!(result.mean_clusters >= 1.0);
    }

    #[test]
    fn test_csd_counts_every_site() {
        let mut sampler = Sampler::new(small_config()).unwrap();
        let run = RunConfig {
            collect_csd: true,
            ..RunConfig::new(10)
        };
        let result = run_sweep_loop(&mut sampler, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        let sites: u64 = result
            .csd
            .iter()
            .enumerate()
            .map(|(size, &count)| size as u64 * count)
            .sum();
        assert_eq!(sites, 64 * 10);
    }

    #[test]
    fn test_autocorrelation_requested() {
        let mut sampler = Sampler::new(small_config()).unwrap();
        let run = RunConfig {
            autocorrelation_max_lag: Some(5),
            ..RunConfig::new(100)
        };
        let result = run_sweep_loop(&mut sampler, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        assert_eq!(result.order2_autocorrelation.len(), 6);
        assert_eq!(result.order2_autocorrelation[0], 1.0);
        assert!(result.order2_tau.is_some());
    }

    #[test]
    fn test_all_warmup_measures_nothing() {
        let mut sampler = Sampler::new(small_config()).unwrap();
        let run = RunConfig {
            warmup_sweeps: 10,
            collect_csd: true,
            autocorrelation_max_lag: Some(3),
            ..RunConfig::new(10)
        };
        let result = run_sweep_loop(&mut sampler, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        assert_eq!(sampler.sweeps_done(), 10);
        assert_eq!(result.n_measurements, 0);
        assert!(result.order2_autocorrelation.is_empty());
        assert_eq!(result.order2_tau, None);
        assert!(result.csd.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_interrupt_stops_between_sweeps() {
        let mut sampler = Sampler::new(small_config()).unwrap();
        let interrupted = AtomicBool::new(false);
        let res = run_sweep_loop(&mut sampler, &RunConfig::new(50), &interrupted, &|id, _| {
            if id == 2 {
                interrupted.store(true, Ordering::Relaxed);
            }
        });
        assert_eq!(res, Err(SamplerError::Interrupted));
        assert_eq!(sampler.sweeps_done(), 3);
    }

    #[test]
    fn test_invalid_run_config() {
        let mut sampler = Sampler::new(small_config()).unwrap();
        let res = run_sweep_loop(&mut sampler, &RunConfig::new(0), &AtomicBool::new(false), &|_, _| {});
        assert!(matches!(res, Err(SamplerError::InvalidRunConfig(_))));
        assert_eq!(sampler.sweeps_done(), 0);
    }

    #[test]
    fn test_chains_aggregate() {
        let run = RunConfig::new(20);
        let result =
            run_chains_parallel(&small_config(), 4, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        assert_eq!(result.n_measurements, 80);

        let single =
            run_chains_parallel(&small_config(), 1, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        assert_eq!(single.n_measurements, 20);

        assert!(run_chains_parallel(&small_config(), 0, &run, &AtomicBool::new(false), &|_, _| {}).is_err());
    }

    #[test]
    fn test_chains_are_reproducible() {
        let run = RunConfig::new(15);
        let a = run_chains_parallel(&small_config(), 3, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        let b = run_chains_parallel(&small_config(), 3, &run, &AtomicBool::new(false), &|_, _| {}).unwrap();
        assert_eq!(a, b);
    }
}
