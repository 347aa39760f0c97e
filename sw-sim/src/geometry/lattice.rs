use crate::error::{Result, SamplerError};

/// A lattice coordinate, `0 <= x < x_range`, `0 <= y < y_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Site {
    pub x: usize,
    pub y: usize,
}

impl Site {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Forward bond directions. Every site owns at most one bond per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondDir {
    /// Toward `y + 1`.
    Down = 0,
    /// Toward `x + 1`.
    Right = 1,
}

impl BondDir {
    /// Traversal order within a site: the down bond is visited before the right bond.
    pub const ALL: [BondDir; 2] = [BondDir::Down, BondDir::Right];
}

/// Number of forward bond slots per site.
pub const N_DIRS: usize = 2;

/// Open-boundary 2D square lattice with a precomputed forward-neighbor table.
///
/// Sites are indexed in row-major order over `(x, y)`: site `(x, y)` has flat
/// index `x * y_range + y`. Bond slots are stored as `site * 2 + dir`; a slot
/// whose neighbor falls outside the lattice is absent and never activates.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    pub x_range: usize,
    pub y_range: usize,
    /// Total number of sites (`x_range * y_range`).
    pub n_sites: usize,
    /// Forward neighbor per bond slot, `u32::MAX` where the bond is absent.
    neighbors: Vec<u32>,
}

const ABSENT: u32 = u32::MAX;

impl Lattice {
    /// Build an `x_range` by `y_range` lattice.
    ///
    /// Fails with [`SamplerError::InvalidDimension`] when either extent is zero
    /// or the site count does not fit the `u32` indices used by union-find.
    pub fn new(x_range: usize, y_range: usize) -> Result<Self> {
        let n_sites = x_range
            .checked_mul(y_range)
            .filter(|&n| n > 0 && n < ABSENT as usize)
            .ok_or(SamplerError::InvalidDimension { x_range, y_range })?;

        let mut neighbors = vec![ABSENT; n_sites * N_DIRS];
        for x in 0..x_range {
            for y in 0..y_range {
                let i = x * y_range + y;
                if y + 1 < y_range {
                    neighbors[i * N_DIRS + BondDir::Down as usize] = (i + 1) as u32;
                }
                if x + 1 < x_range {
                    neighbors[i * N_DIRS + BondDir::Right as usize] = (i + y_range) as u32;
                }
            }
        }

        Ok(Self {
            x_range,
            y_range,
            n_sites,
            neighbors,
        })
    }

    #[inline]
    pub fn index(&self, site: Site) -> usize {
        debug_assert!(site.x < self.x_range && site.y < self.y_range);
        site.x * self.y_range + site.y
    }

    #[inline]
    pub fn site(&self, flat_idx: usize) -> Site {
        Site::new(flat_idx / self.y_range, flat_idx % self.y_range)
    }

    /// Forward neighbor of `flat_idx` along `dir`, or `None` at the open boundary.
    #[inline]
    pub fn neighbor(&self, flat_idx: usize, dir: BondDir) -> Option<usize> {
        match self.neighbors[flat_idx * N_DIRS + dir as usize] {
            ABSENT => None,
            j => Some(j as usize),
        }
    }

    /// Number of bond slots (present or not), `n_sites * 2`.
    #[inline]
    pub fn n_bond_slots(&self) -> usize {
        self.n_sites * N_DIRS
    }

    /// Number of bonds that actually exist on the open lattice.
    pub fn n_bonds(&self) -> usize {
        self.x_range * (self.y_range - 1) + (self.x_range - 1) * self.y_range
    }

    /// All existing bonds as `(slot, site, neighbor)`, in row-major site order
    /// with the down bond before the right bond.
    pub fn bonds(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.n_sites).flat_map(move |i| {
            BondDir::ALL
                .into_iter()
                .filter_map(move |d| self.neighbor(i, d).map(|j| (i * N_DIRS + d as usize, i, j)))
        })
    }
}
