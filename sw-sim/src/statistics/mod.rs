pub mod autocorrelation;
pub mod results;
mod stats;

pub use autocorrelation::{sokal_tau, AutocorrAccum};
pub use results::{SweepResult, SweepStats};
pub use stats::Statistics;
