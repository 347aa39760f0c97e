//! `sw-sampler`: run Swendsen-Wang chains on an open 2D lattice and report
//! Potts observables.

mod render;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sw_sim::{run_chains_parallel, RelabelMode, RunConfig, SamplerConfig, Snapshot};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Swendsen-Wang cluster sampler for 2D Ising/Potts lattices.
#[derive(Parser, Debug)]
#[command(name = "sw-sampler", version, about, long_about = None)]
struct Cli {
    /// Lattice extent along x (rows).
    #[arg(long, default_value_t = 64)]
    x_range: usize,

    /// Lattice extent along y (columns).
    #[arg(long, default_value_t = 64)]
    y_range: usize,

    /// Number of labels; 2 uses the Ising alphabet {-1, +1}.
    #[arg(long, default_value_t = 2)]
    labels: usize,

    /// Coupling strength.
    #[arg(long, default_value_t = 0.5)]
    beta: f64,

    #[arg(long, default_value_t = 1000)]
    sweeps: usize,

    /// Sweeps discarded before measurements start.
    #[arg(long, default_value_t = 0)]
    warmup: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Independent chains, seeded `seed`, `seed + 1`, ...
    #[arg(long, default_value_t = 1)]
    chains: usize,

    /// Print the lattice every N sweeps (single chain only).
    #[arg(long, value_name = "N")]
    render_every: Option<usize>,

    /// Which clusters receive a new label: `subset` or `all`.
    #[arg(long, default_value = "subset", value_parser = parse_relabel)]
    relabel: RelabelMode,

    /// Activate bonds row by row on the rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Report the FK cluster-size distribution.
    #[arg(long, default_value_t = false)]
    csd: bool,

    /// Measure the autocorrelation of m² up to this lag.
    #[arg(long, value_name = "LAG")]
    autocorr_lag: Option<usize>,

    /// Hide the progress bar.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn parse_relabel(s: &str) -> Result<RelabelMode, String> {
    RelabelMode::try_from(s)
}

fn sampler_config(cli: &Cli) -> SamplerConfig {
    SamplerConfig {
        x_range: cli.x_range,
        y_range: cli.y_range,
        labels: cli.labels,
        beta: cli.beta,
        homogeneous: true,
        relabel_mode: cli.relabel,
        sequential: !cli.parallel,
        seed: cli.seed,
    }
}

fn run_config(cli: &Cli) -> RunConfig {
    RunConfig {
        n_sweeps: cli.sweeps,
        warmup_sweeps: cli.warmup,
        collect_csd: cli.csd,
        autocorrelation_max_lag: cli.autocorr_lag,
    }
}

/// Raise `flag` on the first Ctrl-C; the run loop stops after the sweep in
/// progress.
fn watch_for_interrupt(flag: Arc<AtomicBool>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;
    std::thread::spawn(move || {
        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("interrupt received, stopping after the current sweep");
                    flag.store(true, Ordering::Relaxed);
                }
                Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
            }
        });
    });
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config = sampler_config(&cli);
    config.check().context("invalid sampler configuration")?;
    let alphabet = config.alphabet()?;

    let run_config = run_config(&cli);

    info!(
        x_range = config.x_range,
        y_range = config.y_range,
        labels = config.labels,
        beta = config.beta,
        q = sw_sim::mcmc::bonds::activation_probability(config.beta),
        relabel = ?config.relabel_mode,
        "configured"
    );

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new((cli.sweeps * cli.chains) as u64)
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )
        .context("progress bar template")?
        .progress_chars("=> "),
    );
    pb.set_message("sweeps");

    let render_every = cli.render_every.filter(|&k| k > 0 && cli.chains == 1);
    let on_sweep = |sweep_id: usize, snapshot: Snapshot<'_>| {
        pb.inc(1);
        if let Some(k) = render_every {
            if sweep_id % k == 0 {
                let frame = render::render(snapshot, &alphabet);
                pb.suspend(|| println!("sweep {sweep_id}\n{frame}"));
            }
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    watch_for_interrupt(Arc::clone(&interrupted))?;
    let result = run_chains_parallel(&config, cli.chains, &run_config, &interrupted, &on_sweep);
    pb.finish_and_clear();
    let result = result.context("sampling failed")?;

    if result.n_measurements == 0 {
        println!("no measurement sweeps: --warmup covers the whole run");
        return Ok(());
    }

    println!("measurements      {}", result.n_measurements);
    println!("energy / site     {:.6}", result.energy);
    println!("energy^2          {:.6}", result.energy2);
    println!("order parameter   {:.6}", result.order);
    println!("order^2           {:.6}", result.order2);
    println!("binder cumulant   {:.6}", result.binder_cumulant());
    println!("mean clusters     {:.3}", result.mean_clusters);
    println!("largest fraction  {:.6}", result.mean_largest_fraction);
    println!("bond survival     {:.6}", result.mean_bond_survival);
    if let Some(tau) = result.order2_tau {
        println!("tau_int(m^2)      {tau:.3}");
    }
    if cli.csd {
        println!("cluster sizes");
        for (size, &count) in result.csd.iter().enumerate().filter(|(_, &c)| c > 0) {
            println!("  {size:>6} {count}");
        }
    }

    Ok(())
}
