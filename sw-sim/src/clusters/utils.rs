use crate::geometry::Lattice;
use crate::state::BondFlags;

// --- Union-Find ---
//
// Array-backed: `parent` and `rank` are indexed by flat site index, so the
// whole forest is two flat buffers and no pointers.

#[inline]
pub(super) fn find(parent: &mut [u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        parent[x as usize] = parent[parent[x as usize] as usize];
        x = parent[x as usize];
    }
    x
}

#[inline]
pub(super) fn union(parent: &mut [u32], rank: &mut [u8], x: u32, y: u32) {
    let rx = find(parent, x);
    let ry = find(parent, y);
    if rx == ry {
        return;
    }
    match rank[rx as usize].cmp(&rank[ry as usize]) {
        std::cmp::Ordering::Less => parent[rx as usize] = ry,
        std::cmp::Ordering::Greater => parent[ry as usize] = rx,
        std::cmp::Ordering::Equal => {
            parent[ry as usize] = rx;
            rank[rx as usize] += 1;
        }
    }
}

/// Union the endpoints of every active bond. Returns the flattened parent
/// array: `parent[i]` is the root of site `i`'s component.
pub(super) fn uf_bonds(lattice: &Lattice, bonds: &BondFlags) -> Vec<u32> {
    let n_sites = lattice.n_sites;
    let mut parent: Vec<u32> = (0..n_sites as u32).collect();
    let mut rank = vec![0u8; n_sites];

    for (slot, i, j) in lattice.bonds() {
        if bonds.is_active(slot) {
            union(&mut parent, &mut rank, i as u32, j as u32);
        }
    }

    for i in 0..n_sites {
        parent[i] = find(&mut parent, i as u32);
    }
    parent
}
