//! Symmetry-reduced coordinates. Flip and twist are reduced by the 8
//! symmetries that keep the D-layer fixed as a set without quarter turns; the
//! 8-piece permutations by all 16.

use crate::{
    cubie::{CubieCube, N_FLIP, N_PERM, N_TWIST},
    symmetry::{SYMMETRIES, edge_sym_to_corner_sym},
};

pub const N_FLIP_SYM: usize = 336;
pub const N_TWIST_SYM: usize = 324;
pub const N_PERM_SYM: usize = 2768;

/// A dense `rows × cols` table of coordinates.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CoordTable {
    cols: usize,
    data: Box<[u16]>,
}

impl CoordTable {
    pub(crate) fn build(
        rows: usize,
        cols: usize,
        mut entry: impl FnMut(usize, usize) -> u16,
    ) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(entry(row, col));
            }
        }
        Self {
            cols,
            data: data.into_boxed_slice(),
        }
    }

    pub(crate) fn from_raw(cols: usize, data: Box<[u16]>) -> Self {
        Self { cols, data }
    }

    #[inline(always)]
    pub(crate) fn get(&self, row: usize, col: usize) -> usize {
        usize::from(self.data[row * self.cols + col])
    }

    pub(crate) fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn data(&self) -> &[u16] {
        &self.data
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum SymCoordinate {
    Flip,
    Twist,
    Perm,
}

impl SymCoordinate {
    fn raw_size(self) -> usize {
        match self {
            SymCoordinate::Flip => N_FLIP,
            SymCoordinate::Twist => N_TWIST,
            SymCoordinate::Perm => N_PERM,
        }
    }

    pub(crate) fn class_count(self) -> usize {
        match self {
            SymCoordinate::Flip => N_FLIP_SYM,
            SymCoordinate::Twist => N_TWIST_SYM,
            SymCoordinate::Perm => N_PERM_SYM,
        }
    }

    /// Flip and twist only use the even symmetries.
    fn sym_step(self) -> usize {
        match self {
            SymCoordinate::Flip | SymCoordinate::Twist => 2,
            SymCoordinate::Perm => 1,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cube_with(self, raw: usize) -> CubieCube {
        let raw = raw as u16;
        let mut cube = CubieCube::SOLVED;
        match self {
            SymCoordinate::Flip => cube.set_flip(raw),
            SymCoordinate::Twist => cube.set_twist(raw),
            SymCoordinate::Perm => cube.set_edge_perm(raw),
        }
        cube
    }

    fn raw_of(self, cube: &CubieCube) -> usize {
        usize::from(match self {
            SymCoordinate::Flip => cube.flip(),
            SymCoordinate::Twist => cube.twist(),
            SymCoordinate::Perm => cube.edge_perm(),
        })
    }
}

/// The equivalence classes of one coordinate under conjugation by symmetry.
///
/// Every raw value `r` equals `S⁻¹ · rep · S` for the representative `rep` of
/// its class and some symmetry `S`. For flip and twist `raw_to_sym` packs
/// this as `class << 3 | sym >> 1`. Permutations only store `sym` since
/// the class of a permutation is found by binary search over the sorted
/// representatives.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymClasses {
    pub(crate) sym_to_raw: Box<[u16]>,
    pub(crate) raw_to_sym: Box<[u16]>,
}

impl SymClasses {
    /// Enumerates the classes of `coord` along with the self-symmetry mask of
    /// every class.
    ///
    /// # Panics
    ///
    /// Panics if the number of classes is not the known count.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn build(coord: SymCoordinate) -> (Self, Box<[u16]>) {
        let step = coord.sym_step();
        let mut raw_to_sym = vec![u16::MAX; coord.raw_size()];
        let mut sym_to_raw = Vec::with_capacity(coord.class_count());
        let mut self_sym = Vec::with_capacity(coord.class_count());

        for raw in 0..coord.raw_size() {
            if raw_to_sym[raw] != u16::MAX {
                continue;
            }
            let class = sym_to_raw.len();
            let cube = coord.cube_with(raw);
            let mut mask = 0_u16;
            for sym in (0..16).step_by(step) {
                let image = coord.raw_of(&SYMMETRIES.conjugate(&cube, sym));
                if image == raw {
                    mask |= 1 << (sym / step);
                }
                // Keep the first symmetry reaching each raw value so that
                // representatives map to themselves with symmetry 0.
                if raw_to_sym[image] == u16::MAX {
                    raw_to_sym[image] = match coord {
                        SymCoordinate::Perm => sym as u16,
                        SymCoordinate::Flip | SymCoordinate::Twist => {
                            (class << 4 | sym) as u16 / 2
                        }
                    };
                }
            }
            sym_to_raw.push(raw as u16);
            self_sym.push(mask);
        }

        assert_eq!(
            sym_to_raw.len(),
            coord.class_count(),
            "Unexpected number of {coord:?} symmetry classes"
        );
        (
            Self {
                sym_to_raw: sym_to_raw.into_boxed_slice(),
                raw_to_sym: raw_to_sym.into_boxed_slice(),
            },
            self_sym.into_boxed_slice(),
        )
    }

    pub(crate) fn len(&self) -> usize {
        self.sym_to_raw.len()
    }

    /// `class << 3 | sym >> 1` of the cube's flip.
    pub(crate) fn flip_sym(&self, cube: &CubieCube) -> u16 {
        self.raw_to_sym[usize::from(cube.flip())]
    }

    /// `class << 3 | sym >> 1` of the cube's twist.
    pub(crate) fn twist_sym(&self, cube: &CubieCube) -> u16 {
        self.raw_to_sym[usize::from(cube.twist())]
    }

    #[allow(clippy::cast_possible_truncation)]
    fn class_of(&self, raw: u16) -> u16 {
        match self.sym_to_raw.binary_search(&raw) {
            Ok(class) => class as u16,
            Err(_) => panic!("Permutation {raw} is not a class representative"),
        }
    }

    /// `class << 4 | sym` of the cube's corner permutation.
    pub(crate) fn corner_perm_sym(&self, cube: &CubieCube) -> u16 {
        let packed = self.raw_to_sym[usize::from(cube.corner_perm())];
        let sym = edge_sym_to_corner_sym(packed) & 0xf;
        let rep = SYMMETRIES.conjugate(cube, SYMMETRIES.inverse_of(usize::from(sym)));
        self.class_of(rep.corner_perm()) << 4 | sym
    }

    /// `class << 4 | sym` of the cube's U and D layer edge permutation.
    pub(crate) fn edge_perm_sym(&self, cube: &CubieCube) -> u16 {
        let sym = self.raw_to_sym[usize::from(cube.edge_perm())];
        let rep = SYMMETRIES.conjugate(cube, SYMMETRIES.inverse_of(usize::from(sym)));
        self.class_of(rep.edge_perm()) << 4 | sym
    }
}

/// The corner combination and parity of every permutation class
/// representative.
pub(crate) fn perm_to_comb_parity(perm: &SymClasses) -> Box<[u16]> {
    perm.sym_to_raw
        .iter()
        .map(|&raw| {
            let mut cube = CubieCube::SOLVED;
            cube.set_corner_perm(raw);
            cube.corner_comb_parity()
        })
        .collect()
}

/// The packed edge permutation symmetry coordinate of the inverse of every
/// permutation class representative.
pub(crate) fn perm_inv_edge_sym(perm: &SymClasses) -> Box<[u16]> {
    perm.sym_to_raw
        .iter()
        .map(|&raw| {
            let mut cube = CubieCube::SOLVED;
            cube.set_edge_perm(raw);
            perm.edge_perm_sym(&cube.inverse())
        })
        .collect()
}
