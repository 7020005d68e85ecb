//! The 16-element symmetry group that preserves the UD axis, the URF frame
//! rotations, and the move tables derived from them.

use crate::{
    cubie::CubieCube,
    moves::{MOVE_CUBES, N_MOVES, N_MOVES2, STD_TO_UD, UD_TO_STD},
};
use std::sync::LazyLock;

/// Rotation by 120° about the URF-DBL diagonal.
pub const URF: CubieCube = CubieCube::from_pieces(
    [0, 4, 5, 1, 3, 7, 6, 2],
    [1, 2, 1, 2, 2, 1, 2, 1],
    [1, 8, 5, 9, 3, 11, 7, 10, 0, 4, 6, 2],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1],
);

/// Half turn about the FB axis.
pub const F2: CubieCube = CubieCube::from_pieces(
    [5, 4, 7, 6, 1, 0, 3, 2],
    [0; 8],
    [6, 5, 4, 7, 2, 1, 0, 3, 9, 8, 11, 10],
    [0; 12],
);

/// Quarter turn about the UD axis.
pub const U4: CubieCube = CubieCube::from_pieces(
    [3, 0, 1, 2, 7, 4, 5, 6],
    [0; 8],
    [3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
);

/// Reflection through the plane separating L and R.
pub const LR2: CubieCube = CubieCube::from_pieces(
    [1, 0, 3, 2, 5, 4, 7, 6],
    [3; 8],
    [2, 1, 0, 3, 6, 5, 4, 7, 9, 8, 11, 10],
    [0; 12],
);

pub static URF_INV: LazyLock<CubieCube> = LazyLock::new(|| URF.inverse());

/// Maps a move found on the `i`th URF-conjugated cube back to the frame of
/// the original cube. Rows 3..=5 belong to the inverted cube and therefore
/// also invert the move.
pub const URF_MOVE: [[u8; N_MOVES]; 6] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17],
    [6, 7, 8, 0, 1, 2, 3, 4, 5, 15, 16, 17, 9, 10, 11, 12, 13, 14],
    [3, 4, 5, 6, 7, 8, 0, 1, 2, 12, 13, 14, 15, 16, 17, 9, 10, 11],
    [2, 1, 0, 5, 4, 3, 8, 7, 6, 11, 10, 9, 14, 13, 12, 17, 16, 15],
    [8, 7, 6, 2, 1, 0, 5, 4, 3, 17, 16, 15, 11, 10, 9, 14, 13, 12],
    [5, 4, 3, 8, 7, 6, 2, 1, 0, 14, 13, 12, 17, 16, 15, 11, 10, 9],
];

const SYM_E2C_MAGIC: u32 = 0x00DD_DD00;

/// Corners and edges respond differently to the mirrored symmetries. Given a
/// packed `class << 4 | sym` permutation coordinate computed on edges, this
/// adjusts the symmetry so it describes the same permutation on corners.
#[must_use]
pub const fn edge_sym_to_corner_sym(packed: u16) -> u16 {
    packed ^ ((SYM_E2C_MAGIC >> ((packed & 0xf) << 1)) & 3) as u16
}

/// The set of symmetries fixing a cube, as reported by
/// [`CubieCube::self_symmetries`].
///
/// Bits 0..16 hold the plain symmetries, bits 16..32 and 32..48 the ones
/// found after one and two URF rotations, and bit 48 is set when any
/// combination with inversion fixes the cube.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SelfSymmetry(pub u64);

impl SelfSymmetry {
    const INVERSE_BIT: u32 = 48;

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn plain(self) -> u16 {
        self.0 as u16
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn after_urf(self, rotations: u32) -> u16 {
        (self.0 >> (16 * rotations)) as u16
    }

    #[must_use]
    pub fn with_inverse(self) -> bool {
        self.0 >> Self::INVERSE_BIT & 1 != 0
    }

    /// The URF axes and inversions that would only repeat work already done
    /// on another frame of the same cube.
    #[must_use]
    pub fn conjugate_mask(self) -> u8 {
        let mut mask = 0;
        if self.after_urf(1) != 0 {
            mask |= 0x12;
        }
        if self.after_urf(2) != 0 {
            mask |= 0x24;
        }
        if self.with_inverse() {
            mask |= 0x38;
        }
        mask
    }
}

pub struct Symmetries {
    pub(crate) cubes: [CubieCube; 16],
    /// `mult[i][j] = k` when `cubes[i] · cubes[j] == cubes[k]`.
    pub(crate) mult: [[u8; 16]; 16],
    /// `mult_inv[k][j] = i` when `cubes[i] · cubes[j] == cubes[k]`, so that
    /// `mult_inv[0][j]` is the inverse of `j`.
    pub(crate) mult_inv: [[u8; 16]; 16],
    /// The move that `m` becomes when conjugated by the inverse of the even
    /// symmetry `s`, packed as `m << 3 | s >> 1`.
    pub(crate) sym8_move: [u8; N_MOVES * 8],
    /// The same conjugation over all 16 symmetries and the phase 2 move
    /// indices.
    pub(crate) sym_move_ud: [[u8; N_MOVES2]; 16],
    /// The plain self symmetries of every move.
    pub(crate) move_self_sym: [u16; N_MOVES],
    /// Moves that need not be tried first on a cube fixed by symmetry `s`,
    /// because an equivalent move with a smaller index exists.
    pub(crate) first_move_skip: [u32; 16],
}

pub static SYMMETRIES: LazyLock<Symmetries> = LazyLock::new(Symmetries::new);

fn conjugate_with(
    cube: &CubieCube,
    sym: usize,
    cubes: &[CubieCube; 16],
    mult_inv: &[[u8; 16]; 16],
) -> CubieCube {
    cube.conjugate_by(&cubes[sym], &cubes[usize::from(mult_inv[0][sym])])
}

fn self_symmetries_with(
    cube: &CubieCube,
    cubes: &[CubieCube; 16],
    mult_inv: &[[u8; 16]; 16],
) -> SelfSymmetry {
    let mut current = *cube;
    let mut bits = 0;
    for i in 0..96 {
        let conjugated = conjugate_with(&current, usize::from(mult_inv[0][i % 16]), cubes, mult_inv);
        if conjugated == *cube {
            bits |= 1 << i.min(48);
        }
        if i % 16 == 15 {
            current = current.urf_conjugate();
        }
        if i % 48 == 47 {
            current = current.inverse();
        }
    }
    SelfSymmetry(bits)
}

impl Symmetries {
    #[allow(clippy::cast_possible_truncation)]
    fn new() -> Self {
        let mut cubes = [CubieCube::SOLVED; 16];
        let mut current = CubieCube::SOLVED;
        for (i, slot) in cubes.iter_mut().enumerate() {
            *slot = current;
            current = current.multiply(&U4);
            if i % 4 == 3 {
                current = current.multiply(&LR2);
            }
            if i % 8 == 7 {
                current = current.multiply(&F2);
            }
        }

        let mut mult = [[0; 16]; 16];
        let mut mult_inv = [[0; 16]; 16];
        for i in 0..16 {
            for j in 0..16 {
                let product = cubes[i].multiply(&cubes[j]);
                let k = cubes
                    .iter()
                    .position(|sym| sym.corners == product.corners)
                    .expect("The symmetry group must be closed under multiplication");
                mult[i][j] = k as u8;
                mult_inv[k][j] = i as u8;
            }
        }

        let mut sym_move = [[0; N_MOVES]; 16];
        let mut sym8_move = [0; N_MOVES * 8];
        let mut sym_move_ud = [[0; N_MOVES2]; 16];
        for s in 0..16 {
            for m in 0..N_MOVES {
                let conjugated =
                    conjugate_with(&MOVE_CUBES[m], usize::from(mult_inv[0][s]), &cubes, &mult_inv);
                sym_move[s][m] = MOVE_CUBES
                    .iter()
                    .position(|mv| mv.corners == conjugated.corners)
                    .expect("A conjugated move must be a move") as u8;
            }
            if s % 2 == 0 {
                for m in 0..N_MOVES {
                    sym8_move[m << 3 | s >> 1] = sym_move[s][m];
                }
            }
            for m in 0..N_MOVES2 {
                let std = sym_move[s][usize::from(UD_TO_STD[m])];
                sym_move_ud[s][m] = STD_TO_UD[usize::from(std)];
            }
        }

        let mut move_self_sym = [0; N_MOVES];
        for (slot, cube) in move_self_sym.iter_mut().zip(MOVE_CUBES.iter()) {
            *slot = self_symmetries_with(cube, &cubes, &mult_inv).plain();
        }

        let mut first_move_skip = [0; 16];
        for (s, skip) in first_move_skip.iter_mut().enumerate() {
            for m in 0..N_MOVES {
                if usize::from(sym_move[s][m]) < m {
                    *skip |= 1 << m;
                }
            }
        }

        Self {
            cubes,
            mult,
            mult_inv,
            sym8_move,
            sym_move_ud,
            move_self_sym,
            first_move_skip,
        }
    }

    /// `S⁻¹ · cube · S` for the symmetry `S = cubes[sym]`.
    #[must_use]
    pub fn conjugate(&self, cube: &CubieCube, sym: usize) -> CubieCube {
        conjugate_with(cube, sym, &self.cubes, &self.mult_inv)
    }

    #[must_use]
    pub fn inverse_of(&self, sym: usize) -> usize {
        usize::from(self.mult_inv[0][sym])
    }

    #[must_use]
    pub fn self_symmetries(&self, cube: &CubieCube) -> SelfSymmetry {
        self_symmetries_with(cube, &self.cubes, &self.mult_inv)
    }

    /// The first moves made redundant by the plain self symmetries `ssym`.
    #[must_use]
    pub fn skip_moves(&self, ssym: u16) -> u32 {
        (1..16)
            .filter(|&s| ssym >> s & 1 != 0)
            .fold(0, |skip, s| skip | self.first_move_skip[s])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{Face, Move};

    #[test]
    fn symmetries_form_a_group() {
        let syms = &*SYMMETRIES;
        assert_eq!(syms.cubes[0], CubieCube::SOLVED);
        for i in 0..16 {
            assert_eq!(syms.mult[i][syms.inverse_of(i)], 0);
            for j in 0..16 {
                let k = usize::from(syms.mult[i][j]);
                assert_eq!(usize::from(syms.mult_inv[k][j]), i);
            }
        }
        let distinct = syms
            .cubes
            .iter()
            .map(|cube| cube.corners)
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(distinct.len(), 16);
    }

    #[test]
    fn urf_inverse_has_known_corner_perm() {
        assert_eq!(URF_INV.corner_perm(), 2089);
        assert_eq!(URF.multiply(&URF_INV), CubieCube::SOLVED);
    }

    #[test]
    fn conjugated_moves_keep_their_axis_class() {
        let syms = &*SYMMETRIES;
        for s in 0..16 {
            // Every reduction symmetry preserves the UD axis.
            for power in 0..3 {
                let m = usize::from(syms.sym_move_ud[s][power]);
                assert!(m < 3 || (5..8).contains(&m), "sym {s}");
            }
            for m in 0..N_MOVES2 {
                assert!(usize::from(syms.sym_move_ud[s][m]) < N_MOVES2);
            }
        }
        for s in 0..8 {
            for power in 0..3 {
                let m = usize::from(syms.sym8_move[power << 3 | s]);
                assert!(m < 3 || (9..12).contains(&m));
            }
        }
    }

    #[test]
    fn conjugating_a_move_cube_matches_the_move_tables() {
        let syms = &*SYMMETRIES;
        for s in (0..16).step_by(2) {
            for m in 0..N_MOVES {
                let conjugated = syms.conjugate(&MOVE_CUBES[m], syms.inverse_of(s));
                let expected = MOVE_CUBES[usize::from(syms.sym8_move[m << 3 | s >> 1])];
                assert_eq!(conjugated, expected);
            }
        }
        for s in 0..16 {
            for m in 0..N_MOVES2 {
                let std = usize::from(UD_TO_STD[m]);
                let conjugated = syms.conjugate(&MOVE_CUBES[std], syms.inverse_of(s));
                let expected = UD_TO_STD[usize::from(syms.sym_move_ud[s][m])];
                assert_eq!(conjugated, MOVE_CUBES[usize::from(expected)]);
            }
        }
    }

    #[test]
    fn urf_move_remaps_conjugated_moves() {
        for m in 0..N_MOVES {
            let original = URF.multiply(&MOVE_CUBES[m]).multiply(&URF_INV);
            assert_eq!(original, MOVE_CUBES[usize::from(URF_MOVE[1][m])], "move {m}");
        }
    }

    #[test]
    fn solved_cube_is_fully_symmetric() {
        let ssym = CubieCube::SOLVED.self_symmetries();
        assert_eq!(ssym.plain(), 0xffff);
        assert_eq!(ssym.conjugate_mask(), 0x3e);
        let turned = CubieCube::SOLVED.apply_move(Move::new(Face::R, 1));
        let ssym = turned.self_symmetries();
        assert_eq!(ssym.plain(), 0x0401);
        assert!(ssym.with_inverse());

        let mut rng = fastrand::Rng::with_seed(3);
        let scrambled = CubieCube::random(&mut rng);
        assert_eq!(scrambled.self_symmetries(), SelfSymmetry(1));
    }

    #[test]
    fn e2c_only_touches_mirrored_symmetries() {
        for sym in 0..4 {
            assert_eq!(edge_sym_to_corner_sym(sym), sym);
        }
        assert_ne!(edge_sym_to_corner_sym(4), 4);
    }
}
