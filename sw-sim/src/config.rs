use crate::error::{Result, SamplerError};
use crate::state::Alphabet;
use validator::{Validate, ValidationError};

/// Which clusters receive a fresh label in the relabel pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelabelMode {
    /// Draw `m ~ UniformInt[1, k]`, relabel `m` clusters chosen without replacement.
    #[default]
    Subset,
    /// Relabel every cluster independently (textbook Swendsen-Wang).
    All,
}

impl TryFrom<&str> for RelabelMode {
    type Error = String;
    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "subset" => Ok(Self::Subset),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "unknown relabel_mode '{s}', expected 'subset' or 'all'"
            )),
        }
    }
}

/// Model and chain parameters for one [`Sampler`](crate::Sampler).
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub x_range: usize,
    pub y_range: usize,
    /// Alphabet size `q`; 2 gives the Ising alphabet `{-1, +1}`.
    pub labels: usize,
    /// Coupling shared by every bond.
    pub beta: f64,
    /// Must be `true`: site-dependent couplings are not supported.
    pub homogeneous: bool,
    pub relabel_mode: RelabelMode,
    /// `true`: one draw stream over all bonds in traversal order.
    /// `false`: row-seeded bond activation spread over rayon workers.
    pub sequential: bool,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            x_range: 64,
            y_range: 64,
            labels: 2,
            beta: 0.5,
            homogeneous: true,
            relabel_mode: RelabelMode::Subset,
            sequential: true,
            seed: 42,
        }
    }
}

impl SamplerConfig {
    pub fn new(x_range: usize, y_range: usize) -> Self {
        Self {
            x_range,
            y_range,
            ..Self::default()
        }
    }

    /// Reject configurations the sampler cannot run.
    pub fn check(&self) -> Result<()> {
        if !self.homogeneous {
            return Err(SamplerError::UnsupportedModel);
        }
        if self.x_range == 0 || self.y_range == 0 {
            return Err(SamplerError::InvalidDimension {
                x_range: self.x_range,
                y_range: self.y_range,
            });
        }
        if self.labels < 2 {
            return Err(SamplerError::InvalidAlphabet(format!(
                "need at least 2 labels, got {}",
                self.labels
            )));
        }
        if self.beta.is_nan() || self.beta < 0.0 {
            return Err(SamplerError::InvalidCoupling(self.beta));
        }
        Ok(())
    }

    pub fn alphabet(&self) -> Result<Alphabet> {
        Alphabet::for_labels(self.labels)
    }
}

fn validate_run_config(cfg: &RunConfig) -> std::result::Result<(), ValidationError> {
    if cfg.n_sweeps < 1 {
        return Err(ValidationError::new("n_sweeps must be >= 1"));
    }
    if cfg.warmup_sweeps > cfg.n_sweeps {
        return Err(ValidationError::new("warmup_sweeps must be <= n_sweeps"));
    }
    if cfg.autocorrelation_max_lag == Some(0) {
        return Err(ValidationError::new("autocorrelation_max_lag must be >= 1"));
    }
    Ok(())
}

/// Length and measurement options of a sampling run.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_run_config"))]
pub struct RunConfig {
    pub n_sweeps: usize,
    /// Sweeps discarded before measurement starts.
    pub warmup_sweeps: usize,
    /// Accumulate the FK cluster-size histogram.
    pub collect_csd: bool,
    /// Track the autocorrelation of m² up to this lag.
    pub autocorrelation_max_lag: Option<usize>,
}

impl RunConfig {
    pub fn new(n_sweeps: usize) -> Self {
        Self {
            n_sweeps,
            warmup_sweeps: 0,
            collect_csd: false,
            autocorrelation_max_lag: None,
        }
    }

    pub(crate) fn checked(&self) -> Result<()> {
        self.validate()
            .map_err(|e| SamplerError::InvalidRunConfig(format!("{e}")))
    }
}
