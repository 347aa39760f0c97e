pub mod lattice;

pub use lattice::{BondDir, Lattice, Site, N_DIRS};
