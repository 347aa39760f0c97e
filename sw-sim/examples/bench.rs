use std::sync::atomic::AtomicBool;
use std::time::Instant;

use sw_sim::{run_chains_parallel, RelabelMode, RunConfig, SamplerConfig};

const L: usize = 256;
const LABELS: usize = 2;
const BETA: f64 = 0.88;
const N_SWEEPS: usize = 200;
const N_CHAINS: usize = 8;

fn main() {
    let interrupted = AtomicBool::new(false);
    let run = RunConfig {
        warmup_sweeps: 0,
        collect_csd: true,
        ..RunConfig::new(N_SWEEPS)
    };

    println!(
        "Lattice: {}x{}  |  Labels: {}  |  Beta: {}  |  Sweeps: {}  |  Chains: {}",
        L, L, LABELS, BETA, N_SWEEPS, N_CHAINS
    );
    println!("{}", "-".repeat(70));

    for (name, relabel_mode, sequential) in [
        ("subset, single stream", RelabelMode::Subset, true),
        ("all, single stream", RelabelMode::All, true),
        ("all, row-parallel", RelabelMode::All, false),
    ] {
        let config = SamplerConfig {
            labels: LABELS,
            beta: BETA,
            relabel_mode,
            sequential,
            ..SamplerConfig::new(L, L)
        };

        let t0 = Instant::now();
        let result = run_chains_parallel(&config, N_CHAINS, &run, &interrupted, &|_, _| {}).unwrap();
        let elapsed = t0.elapsed().as_secs_f64();

        let per_sweep = elapsed / N_SWEEPS as f64 * 1000.0;
        println!(
            "{:<24} Total: {:.3} s  |  {:.3} ms/sweep  |  <E> = {:.4}  |  <|m|> = {:.4}",
            name, elapsed, per_sweep, result.energy, result.order
        );
    }
}
