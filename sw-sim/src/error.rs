use thiserror::Error;

/// Errors raised while building or running a sampler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplerError {
    /// A lattice extent is zero, or the site count does not fit a `u32` index.
    #[error("invalid lattice dimension {x_range}x{y_range}")]
    InvalidDimension { x_range: usize, y_range: usize },

    #[error("invalid label alphabet: {0}")]
    InvalidAlphabet(String),

    /// Site-dependent couplings were requested; only a single shared beta is supported.
    #[error("non-homogeneous coupling is not supported")]
    UnsupportedModel,

    #[error("coupling beta must be a non-negative number, got {0}")]
    InvalidCoupling(f64),

    /// The cluster partition handed to the relabeler is malformed. This is an
    /// internal invariant violation and aborts the run.
    #[error("invalid cluster partition: {0}")]
    InvalidPartition(String),

    #[error("invalid run configuration: {0}")]
    InvalidRunConfig(String),

    #[error("interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, SamplerError>;
