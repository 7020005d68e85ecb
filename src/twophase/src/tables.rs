//! Every move, conjugation, and pruning table the search reads, built once per
//! process.

use crate::{
    coord::{
        CoordTable, N_FLIP_SYM, N_PERM_SYM, N_TWIST_SYM, SymClasses, SymCoordinate,
        perm_inv_edge_sym, perm_to_comb_parity,
    },
    cubie::{CubieCube, N_COMB, N_MPERM, N_SLICE},
    moves::{MOVE_CUBES, N_MOVES, N_MOVES2, UD_TO_STD},
    pruning::{PruningParams, PruningTable, build_pruning_table},
    start, success,
    symmetry::{SYMMETRIES, edge_sym_to_corner_sym},
    working,
};
use log::{debug, info};
use std::{sync::OnceLock, time::Instant};

/// Phase 2 quarter turns of U and D flip the corner permutation parity.
const PARITY_MOVES: u32 = 0xA5;

static TABLES: OnceLock<Tables> = OnceLock::new();

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tables {
    pub(crate) flip: SymClasses,
    pub(crate) twist: SymClasses,
    pub(crate) perm: SymClasses,
    pub(crate) perm_to_comb_parity: Box<[u16]>,
    pub(crate) perm_inv_edge_sym: Box<[u16]>,

    pub(crate) ud_slice_move: CoordTable,
    pub(crate) ud_slice_conj: CoordTable,
    pub(crate) twist_move: CoordTable,
    pub(crate) flip_move: CoordTable,
    pub(crate) slice_twist_prun: PruningTable,
    pub(crate) slice_flip_prun: PruningTable,

    pub(crate) corner_perm_move: CoordTable,
    pub(crate) edge_perm_move: CoordTable,
    pub(crate) mid_perm_move: CoordTable,
    pub(crate) mid_perm_conj: CoordTable,
    pub(crate) comb_parity_move: CoordTable,
    pub(crate) comb_parity_conj: CoordTable,
    pub(crate) mid_corner_prun: PruningTable,
    pub(crate) edge_comb_prun: PruningTable,
}

impl Tables {
    /// The process-wide tables, generating them on first use.
    pub fn get() -> &'static Tables {
        TABLES.get_or_init(Tables::generate)
    }

    /// Makes `tables` the process-wide tables. Returns the tables back if
    /// some were already in place.
    ///
    /// # Errors
    ///
    /// Fails if the process-wide tables have already been generated or
    /// installed.
    pub fn install(tables: Tables) -> Result<&'static Tables, Tables> {
        TABLES.set(tables)?;
        Ok(Tables::get())
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn generate() -> Tables {
        info!(start!("Generating two-phase tables"));
        let start = Instant::now();

        let (flip, flip_self_sym) = SymClasses::build(SymCoordinate::Flip);
        let (twist, twist_self_sym) = SymClasses::build(SymCoordinate::Twist);
        let (perm, perm_self_sym) = SymClasses::build(SymCoordinate::Perm);
        debug!(
            working!("Built {} flip, {} twist, and {} permutation classes in {:.3}s"),
            flip.len(),
            twist.len(),
            perm.len(),
            start.elapsed().as_secs_f64()
        );
        let perm_to_comb_parity = perm_to_comb_parity(&perm);
        let perm_inv_edge_sym = perm_inv_edge_sym(&perm);

        let ud_slice_move = CoordTable::build(N_SLICE, N_MOVES, |slice, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_ud_slice(slice as u16);
            cube.multiply(&MOVE_CUBES[m]).ud_slice()
        });
        let ud_slice_conj = CoordTable::build(N_SLICE, 8, |slice, sym| {
            let mut cube = CubieCube::SOLVED;
            cube.set_ud_slice(slice as u16);
            SYMMETRIES
                .conjugate(&cube, SYMMETRIES.inverse_of(sym << 1))
                .ud_slice()
        });
        let twist_move = CoordTable::build(N_TWIST_SYM, N_MOVES, |class, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_twist(twist.sym_to_raw[class]);
            twist.twist_sym(&cube.multiply(&MOVE_CUBES[m]))
        });
        let flip_move = CoordTable::build(N_FLIP_SYM, N_MOVES, |class, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_flip(flip.sym_to_raw[class]);
            flip.flip_sym(&cube.multiply(&MOVE_CUBES[m]))
        });

        let corner_perm_move = CoordTable::build(N_PERM_SYM, N_MOVES2, |class, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_corner_perm(perm.sym_to_raw[class]);
            perm.corner_perm_sym(&cube.multiply(&MOVE_CUBES[usize::from(UD_TO_STD[m])]))
        });
        let edge_perm_move = CoordTable::build(N_PERM_SYM, N_MOVES2, |class, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_edge_perm(perm.sym_to_raw[class]);
            perm.edge_perm_sym(&cube.multiply(&MOVE_CUBES[usize::from(UD_TO_STD[m])]))
        });
        let mid_perm_move = CoordTable::build(N_MPERM, N_MOVES2, |mid, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_mid_perm(mid as u16);
            cube.multiply(&MOVE_CUBES[usize::from(UD_TO_STD[m])]).mid_perm()
        });
        let mid_perm_conj = CoordTable::build(N_MPERM, 16, |mid, sym| {
            let mut cube = CubieCube::SOLVED;
            cube.set_mid_perm(mid as u16);
            SYMMETRIES
                .conjugate(&cube, SYMMETRIES.inverse_of(sym))
                .mid_perm()
        });
        let comb_parity_move = CoordTable::build(N_COMB, N_MOVES2, |comb, m| {
            let mut cube = CubieCube::SOLVED;
            cube.set_corner_comb((comb % 70) as u16);
            let parity = (PARITY_MOVES >> m & 1) as usize ^ (comb / 70);
            let moved = cube.multiply(&MOVE_CUBES[usize::from(UD_TO_STD[m])]);
            moved.corner_comb() + 70 * parity as u16
        });
        let comb_parity_conj = CoordTable::build(N_COMB, 16, |comb, sym| {
            let mut cube = CubieCube::SOLVED;
            cube.set_corner_comb((comb % 70) as u16);
            let conjugated = SYMMETRIES.conjugate(&cube, SYMMETRIES.inverse_of(sym));
            conjugated.corner_comb() + 70 * (comb / 70) as u16
        });

        let slice_twist_prun = build_pruning_table(
            &ud_slice_move,
            &ud_slice_conj,
            &twist_move,
            &twist_self_sym,
            PruningParams {
                sym_shift: 3,
                e2c: false,
                name: "Slice-twist",
            },
        );
        let slice_flip_prun = build_pruning_table(
            &ud_slice_move,
            &ud_slice_conj,
            &flip_move,
            &flip_self_sym,
            PruningParams {
                sym_shift: 3,
                e2c: false,
                name: "Slice-flip",
            },
        );
        let mid_corner_prun = build_pruning_table(
            &mid_perm_move,
            &mid_perm_conj,
            &corner_perm_move,
            &perm_self_sym,
            PruningParams {
                sym_shift: 4,
                e2c: true,
                name: "Middle-corner",
            },
        );
        let edge_comb_prun = build_pruning_table(
            &comb_parity_move,
            &comb_parity_conj,
            &edge_perm_move,
            &perm_self_sym,
            PruningParams {
                sym_shift: 4,
                e2c: false,
                name: "Edge-combination",
            },
        );

        info!(
            success!("Two-phase tables generated in {:.3}s"),
            start.elapsed().as_secs_f64()
        );

        Tables {
            flip,
            twist,
            perm,
            perm_to_comb_parity,
            perm_inv_edge_sym,
            ud_slice_move,
            ud_slice_conj,
            twist_move,
            flip_move,
            slice_twist_prun,
            slice_flip_prun,
            corner_perm_move,
            edge_perm_move,
            mid_perm_move,
            mid_perm_conj,
            comb_parity_move,
            comb_parity_conj,
            mid_corner_prun,
            edge_comb_prun,
        }
    }

    /// The packed permutation symmetry coordinate of the inverse of the
    /// permutation `class << 4 | sym`, computed on corners when `corner` is
    /// set.
    pub(crate) fn perm_sym_inv(&self, class: usize, sym: usize, corner: bool) -> usize {
        let mut packed = self.perm_inv_edge_sym[class];
        if corner {
            packed = edge_sym_to_corner_sym(packed);
        }
        usize::from(packed & 0xfff0)
            | usize::from(SYMMETRIES.mult[usize::from(packed & 0xf)][sym])
    }

    /// Lower bound on the phase 1 distance of `(twist, tsym, flip, fsym,
    /// slice)`.
    pub(crate) fn phase1_bound(
        &self,
        twist: usize,
        tsym: usize,
        flip: usize,
        fsym: usize,
        slice: usize,
    ) -> u8 {
        self.slice_twist_prun
            .get(twist * N_SLICE + self.ud_slice_conj.get(slice, tsym))
            .max(
                self.slice_flip_prun
                    .get(flip * N_SLICE + self.ud_slice_conj.get(slice, fsym)),
            )
    }

    /// Lower bound from the edge-combination table alone.
    pub(crate) fn edge_comb_bound(
        &self,
        edge: usize,
        esym: usize,
        corner: usize,
        csym: usize,
    ) -> u8 {
        let comb = usize::from(self.perm_to_comb_parity[corner]);
        let sym = usize::from(SYMMETRIES.mult_inv[esym][csym]);
        self.edge_comb_prun
            .get(edge * N_COMB + self.comb_parity_conj.get(comb, sym))
    }

    /// Lower bound on the phase 2 distance of the corner class and symmetry,
    /// edge class and symmetry, and middle permutation.
    pub(crate) fn phase2_bound(
        &self,
        edge: usize,
        esym: usize,
        corner: usize,
        csym: usize,
        mid: usize,
    ) -> u8 {
        self.mid_corner_prun
            .get(corner * N_MPERM + self.mid_perm_conj.get(mid, csym))
            .max(self.edge_comb_bound(edge, esym, corner, csym))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{Move, MoveSequence, random_scramble};

    fn phase1_bound_of(tables: &Tables, cube: &CubieCube) -> u8 {
        let twist = usize::from(tables.twist.twist_sym(cube));
        let flip = usize::from(tables.flip.flip_sym(cube));
        tables.phase1_bound(
            twist >> 3,
            twist & 7,
            flip >> 3,
            flip & 7,
            usize::from(cube.ud_slice()),
        )
    }

    fn phase2_bounds_of(tables: &Tables, cube: &CubieCube) -> (u8, u8) {
        let corner = usize::from(tables.perm.corner_perm_sym(cube));
        let edge = usize::from(tables.perm.edge_perm_sym(cube));
        let forward = tables.phase2_bound(
            edge >> 4,
            edge & 0xf,
            corner >> 4,
            corner & 0xf,
            usize::from(cube.mid_perm()),
        );
        let edgei = tables.perm_sym_inv(edge >> 4, edge & 0xf, false);
        let corni = tables.perm_sym_inv(corner >> 4, corner & 0xf, true);
        let inverse = tables.edge_comb_bound(edgei >> 4, edgei & 0xf, corni >> 4, corni & 0xf);
        (forward, inverse)
    }

    #[test]
    fn class_counts() {
        let tables = Tables::get();
        assert_eq!(tables.flip.len(), N_FLIP_SYM);
        assert_eq!(tables.twist.len(), N_TWIST_SYM);
        assert_eq!(tables.perm.len(), N_PERM_SYM);
        assert_eq!(tables.perm_inv_edge_sym.len(), N_PERM_SYM);
    }

    #[test]
    fn solved_and_single_moves() {
        let tables = Tables::get();
        assert_eq!(phase1_bound_of(tables, &CubieCube::SOLVED), 0);
        assert_eq!(phase2_bounds_of(tables, &CubieCube::SOLVED), (0, 0));
        for m in [3, 5, 6, 8, 12, 14, 15, 17] {
            assert_eq!(phase1_bound_of(tables, &MOVE_CUBES[m]), 1, "move {m}");
        }
        for &m in &UD_TO_STD[..N_MOVES2] {
            let cube = MOVE_CUBES[usize::from(m)];
            assert_eq!(phase1_bound_of(tables, &cube), 0);
            assert_eq!(phase2_bounds_of(tables, &cube), (1, 1), "move {m}");
        }
    }

    #[test]
    fn phase1_bounds_are_admissible() {
        let tables = Tables::get();
        let mut rng = fastrand::Rng::with_seed(5);
        for len in 0..14 {
            for _ in 0..200 {
                let cube = CubieCube::SOLVED.apply_moves(&random_scramble(len, &mut rng));
                assert!(usize::from(phase1_bound_of(tables, &cube)) <= len);
            }
        }
    }

    #[test]
    fn phase2_bounds_are_admissible() {
        let tables = Tables::get();
        let mut rng = fastrand::Rng::with_seed(6);
        for len in 0..16 {
            for _ in 0..200 {
                let scramble = MoveSequence::from(
                    (0..len)
                        .map(|_| Move::from_index(UD_TO_STD[rng.usize(..N_MOVES2)]))
                        .collect::<Vec<_>>(),
                );
                let cube = CubieCube::SOLVED.apply_moves(&scramble);
                let (forward, inverse) = phase2_bounds_of(tables, &cube);
                assert!(usize::from(forward) <= len);
                assert!(usize::from(inverse) <= len);
            }
        }
    }

    #[test]
    fn install_after_generation_is_refused() {
        let tables = Tables::get();
        assert!(Tables::install(tables.clone()).is_err());
    }
}
