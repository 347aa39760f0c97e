use crate::error::{Result, SamplerError};
use crate::geometry::{BondDir, Lattice, Site, N_DIRS};
use crate::random::RandomSource;

/// A spin / color value. Opaque to the algorithm: only equality matters.
pub type Label = i32;

/// The finite set of labels a site may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    values: Vec<Label>,
}

impl Alphabet {
    /// Conventional alphabet for `q` labels: `{-1, +1}` (Ising) for `q == 2`,
    /// `{0, 1, …, q-1}` (Potts) otherwise.
    pub fn for_labels(q: usize) -> Result<Self> {
        if q < 2 {
            return Err(SamplerError::InvalidAlphabet(format!(
                "need at least 2 labels, got {q}"
            )));
        }
        let values = if q == 2 {
            vec![-1, 1]
        } else {
            let top = Label::try_from(q).map_err(|_| {
                SamplerError::InvalidAlphabet(format!("{q} labels exceed the label range"))
            })?;
            (0..top).collect()
        };
        Ok(Self { values })
    }

    /// Explicit alphabet. Must be non-empty with no repeated values.
    pub fn from_values(values: Vec<Label>) -> Result<Self> {
        if values.is_empty() {
            return Err(SamplerError::InvalidAlphabet("alphabet is empty".into()));
        }
        for (i, v) in values.iter().enumerate() {
            if values[..i].contains(v) {
                return Err(SamplerError::InvalidAlphabet(format!(
                    "label {v} appears more than once"
                )));
            }
        }
        Ok(Self { values })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Label] {
        &self.values
    }

    pub fn contains(&self, label: Label) -> bool {
        self.values.contains(&label)
    }

    pub fn position(&self, label: Label) -> Option<usize> {
        self.values.iter().position(|&v| v == label)
    }

    /// Draw one label uniformly.
    #[inline]
    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Label {
        self.values[rng.uniform_int(0, self.values.len() - 1)]
    }
}

/// One activation flag per bond slot (`site * 2 + dir`).
///
/// Slots of bonds that do not exist on the open lattice are kept `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondFlags {
    active: Vec<bool>,
}

impl BondFlags {
    /// All bonds inactive.
    pub fn inactive(lattice: &Lattice) -> Self {
        Self {
            active: vec![false; lattice.n_bond_slots()],
        }
    }

    /// Set each existing bond from `f(slot, site, neighbor)`.
    pub fn from_fn(lattice: &Lattice, mut f: impl FnMut(usize, usize, usize) -> bool) -> Self {
        let mut flags = Self::inactive(lattice);
        for (slot, i, j) in lattice.bonds() {
            flags.active[slot] = f(slot, i, j);
        }
        flags
    }

    #[inline]
    pub fn is_active(&self, slot: usize) -> bool {
        self.active[slot]
    }

    #[inline]
    pub fn get(&self, flat_idx: usize, dir: BondDir) -> bool {
        self.active[flat_idx * N_DIRS + dir as usize]
    }

    pub fn count_active(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.active
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [bool] {
        &mut self.active
    }
}

/// Labels of every site of a lattice, mutated in place by each sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeState {
    lattice: Lattice,
    alphabet: Alphabet,
    labels: Vec<Label>,
}

impl LatticeState {
    /// Create an `x_range` by `y_range` state with every label drawn
    /// independently and uniformly from `alphabet`, in row-major site order.
    pub fn initialize<R: RandomSource + ?Sized>(
        x_range: usize,
        y_range: usize,
        alphabet: &[Label],
        rng: &mut R,
    ) -> Result<Self> {
        let lattice = Lattice::new(x_range, y_range)?;
        let alphabet = Alphabet::from_values(alphabet.to_vec())?;
        Ok(Self::random(lattice, alphabet, rng))
    }

    pub(crate) fn random<R: RandomSource + ?Sized>(
        lattice: Lattice,
        alphabet: Alphabet,
        rng: &mut R,
    ) -> Self {
        let labels = (0..lattice.n_sites).map(|_| alphabet.draw(rng)).collect();
        Self {
            lattice,
            alphabet,
            labels,
        }
    }

    /// Build a state from explicit labels in row-major order.
    pub fn from_labels(lattice: Lattice, alphabet: Alphabet, labels: Vec<Label>) -> Result<Self> {
        if labels.len() != lattice.n_sites {
            return Err(SamplerError::InvalidDimension {
                x_range: lattice.x_range,
                y_range: lattice.y_range,
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| !alphabet.contains(l)) {
            return Err(SamplerError::InvalidAlphabet(format!(
                "label {bad} is not in the alphabet"
            )));
        }
        Ok(Self {
            lattice,
            alphabet,
            labels,
        })
    }

    #[inline]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[inline]
    pub fn label_at(&self, site: Site) -> Label {
        self.labels[self.lattice.index(site)]
    }

    #[inline]
    pub fn set_label(&mut self, site: Site, label: Label) {
        debug_assert!(self.alphabet.contains(label));
        let i = self.lattice.index(site);
        self.labels[i] = label;
    }

    #[inline]
    pub(crate) fn set_flat(&mut self, flat_idx: usize, label: Label) {
        self.labels[flat_idx] = label;
    }

    /// Bond flags with `active == (labels of both endpoints are equal)`.
    pub fn derive_bonds(&self) -> BondFlags {
        let mut flags = BondFlags::inactive(&self.lattice);
        self.derive_bonds_into(&mut flags);
        flags
    }

    /// Recompute `flags` in place from the current labels.
    pub fn derive_bonds_into(&self, flags: &mut BondFlags) {
        let active = flags.as_mut_slice();
        active.fill(false);
        for (slot, i, j) in self.lattice.bonds() {
            active[slot] = self.labels[i] == self.labels[j];
        }
    }

    /// Number of sites holding each alphabet entry, in alphabet order.
    pub fn label_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.alphabet.len()];
        for &l in &self.labels {
            if let Some(p) = self.alphabet.position(l) {
                counts[p] += 1;
            }
        }
        counts
    }

    /// Potts energy per site with unit coupling: `-(number of equal-label bonds) / N`.
    pub fn energy_per_site(&self) -> f64 {
        let equal = self
            .lattice
            .bonds()
            .filter(|&(_, i, j)| self.labels[i] == self.labels[j])
            .count();
        -(equal as f64) / self.lattice.n_sites as f64
    }

    /// Potts order parameter `(q * max_fraction - 1) / (q - 1)`, in `[0, 1]`.
    ///
    /// For two labels this is the absolute magnetization per site.
    pub fn order_parameter(&self) -> f64 {
        let q = self.alphabet.len();
        if q < 2 {
            return 1.0;
        }
        let max = self.label_counts().into_iter().max().unwrap_or(0);
        let frac = max as f64 / self.lattice.n_sites as f64;
        (q as f64 * frac - 1.0) / (q as f64 - 1.0)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            lattice: &self.lattice,
            labels: &self.labels,
        }
    }
}

/// Read-only view of a [`LatticeState`] for renderers and exporters.
///
/// Clone the state instead when the consumer must outlive the next sweep.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    lattice: &'a Lattice,
    labels: &'a [Label],
}

impl<'a> Snapshot<'a> {
    pub fn x_range(&self) -> usize {
        self.lattice.x_range
    }

    pub fn y_range(&self) -> usize {
        self.lattice.y_range
    }

    pub fn label_at(&self, site: Site) -> Label {
        self.labels[self.lattice.index(site)]
    }

    /// Every site with its label, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Site, Label)> + 'a {
        let lattice = self.lattice;
        self.labels
            .iter()
            .enumerate()
            .map(move |(i, &l)| (lattice.site(i), l))
    }

    /// Labels grouped by `x`, each row holding `y_range` labels.
    pub fn rows(&self) -> impl Iterator<Item = &'a [Label]> + 'a {
        self.labels.chunks(self.lattice.y_range)
    }
}
