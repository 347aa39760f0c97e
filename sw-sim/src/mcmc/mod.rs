pub mod bonds;
pub mod relabel;
