//! The two-phase IDA* search.
//!
//! Phase 1 brings a cube into the subgroup `<U, D, R2, F2, L2, B2>` and phase
//! 2 solves it within that subgroup. Every phase 1 solution of each length is
//! tried against a depth-limited phase 2, over all six URF-conjugated frames
//! of the cube, until a solution shorter than all previous ones runs out of
//! probes or the depth bound is met.

use crate::{
    cubie::{CubieCube, InvalidCubeError},
    facelet::FaceletError,
    moves::{CANONICAL_UD, MOVE_CUBES, Move, MoveSequence, N_MOVES, N_MOVES2, UD_TO_STD},
    symmetry::{SYMMETRIES, URF_MOVE},
    tables::Tables,
};
use bitflags::bitflags;
use log::{debug, trace};
use std::fmt;
use thiserror::Error;

const MAX_PRE_MOVES: usize = 20;
/// The fewest phase 1 moves that must follow a pre-move.
const MIN_P1_LENGTH_PRE: usize = 7;
const MAX_DEPTH2: usize = 13;
/// Every move but the R, F, L, and B clockwise quarter turns. The last
/// pre-move is one of those four so that its inverse can be reached through
/// a half turn.
const PRE_MOVE_TAIL_SKIP: u32 = 0x36FB7;
/// `UD_TRIPLE_JUMP >> m & 3` is the number of later powers of the same face
/// as phase 2 move `m`.
const UD_TRIPLE_JUMP: usize = 0x42;
/// Phase 2 move index meaning "no previous move".
const NO_UD_MOVE: usize = N_MOVES2;

bitflags! {
    /// How a [`Solution`] is printed.
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
    pub struct SolutionFormat: u8 {
        /// A `.` token between the phase 1 and phase 2 moves.
        const SEPARATOR = 1;
        /// The inverse of the solution, which turns a solved cube into the
        /// given state.
        const INVERSE = 1 << 1;
        /// ` (Nf)` after the moves.
        const APPEND_LENGTH = 1 << 2;
        /// Reserved.
        const OPTIMAL = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// The longest solution accepted.
    pub max_depth: usize,
    /// The number of phase 2 attempts after which the search gives up if no
    /// solution was found.
    pub max_probes: u64,
    /// The number of phase 2 attempts the search keeps improving a found
    /// solution for. Clamped to `max_probes`.
    pub min_probes: u64,
    pub format: SolutionFormat,
    /// Also search the inverse of the cube.
    pub try_inverse: bool,
    /// Also search the cube with its U-D axis moved onto R-L and F-B.
    pub try_all_axes: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: 21,
            max_probes: 100_000,
            min_probes: 0,
            format: SolutionFormat::empty(),
            try_inverse: true,
            try_all_axes: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error(transparent)]
    Facelet(#[from] FaceletError),
    #[error(transparent)]
    InvalidCube(#[from] InvalidCubeError),
    #[error("No solution of at most {max_depth} moves exists")]
    NoSolution { max_depth: usize },
    #[error("No solution was found within {max_probes} probes")]
    ProbeLimit { max_probes: u64 },
}

/// A solution, already mapped back to the frame of the searched cube and
/// ordered as [`SolutionFormat::INVERSE`] asks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    moves: MoveSequence,
    /// Index of the first phase 2 move within `moves`.
    separator: Option<usize>,
    format: SolutionFormat,
}

impl Solution {
    fn new(found: &MoveSequence, urf_idx: usize, phase1_len: usize, format: SolutionFormat) -> Self {
        let urf = if format.contains(SolutionFormat::INVERSE) {
            (urf_idx + 3) % 6
        } else {
            urf_idx
        };
        let remap = |mv: &Move| Move::from_index(URF_MOVE[urf][mv.index()]);
        let len = found.len();
        let (moves, separator) = if urf < 3 {
            (found.iter().map(remap).collect::<Vec<_>>(), phase1_len)
        } else {
            (found.iter().rev().map(remap).collect(), len - phase1_len.min(len))
        };
        Self {
            moves: MoveSequence::from(moves),
            separator: (phase1_len < len).then_some(separator),
            format,
        }
    }

    /// The moves as printed.
    #[must_use]
    pub fn moves(&self) -> &MoveSequence {
        &self.moves
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = self
            .separator
            .filter(|_| self.format.contains(SolutionFormat::SEPARATOR));
        let mut first = true;
        for (i, mv) in self.moves.iter().enumerate() {
            if separator == Some(i) {
                f.write_str(if first { "." } else { " ." })?;
                first = false;
            }
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{mv}")?;
            first = false;
        }
        if self.format.contains(SolutionFormat::APPEND_LENGTH) {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "({}f)", self.moves.len())?;
        }
        Ok(())
    }
}

/// What a level of the search tells its caller.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Outcome {
    /// Stop searching altogether.
    Stop,
    /// Try the next move.
    Continue,
    /// The remaining powers of the current axis cannot do better.
    SkipAxis,
}

/// The phase 1 coordinates of a node, with twist and flip reduced by the 8
/// symmetries that preserve the UD slice.
#[derive(Clone, Copy, Debug)]
struct Phase1Node {
    twist: usize,
    tsym: usize,
    flip: usize,
    fsym: usize,
    slice: usize,
    prun: usize,
}

impl Phase1Node {
    fn new(tables: &Tables, cube: &CubieCube) -> Self {
        let twist = usize::from(tables.twist.twist_sym(cube));
        let flip = usize::from(tables.flip.flip_sym(cube));
        let mut node = Self {
            twist: twist >> 3,
            tsym: twist & 7,
            flip: flip >> 3,
            fsym: flip & 7,
            slice: usize::from(cube.ud_slice()),
            prun: 0,
        };
        node.prun = node.bound(tables);
        node
    }

    fn apply(self, tables: &Tables, m: usize) -> Self {
        let flip = tables
            .flip_move
            .get(self.flip, usize::from(SYMMETRIES.sym8_move[m << 3 | self.fsym]));
        let twist = tables
            .twist_move
            .get(self.twist, usize::from(SYMMETRIES.sym8_move[m << 3 | self.tsym]));
        let mut node = Self {
            twist: twist >> 3,
            tsym: (twist & 7) ^ self.tsym,
            flip: flip >> 3,
            fsym: (flip & 7) ^ self.fsym,
            slice: tables.ud_slice_move.get(self.slice, m),
            prun: 0,
        };
        node.prun = node.bound(tables);
        node
    }

    fn bound(&self, tables: &Tables) -> usize {
        usize::from(tables.phase1_bound(self.twist, self.tsym, self.flip, self.fsym, self.slice))
    }
}

/// The state of one solve. A `Search` may be reused for any number of cubes.
pub struct Search<'a> {
    tables: &'a Tables,
    options: SearchOptions,

    moves: Vec<u8>,
    pre_moves: [u8; MAX_PRE_MOVES],
    phase1_cubes: Vec<CubieCube>,
    urf_cubes: [CubieCube; 6],
    urf_ssym: [u16; 6],

    urf_idx: usize,
    length1: usize,
    depth1: usize,
    max_dep2: usize,
    sol_len: usize,
    valid1: usize,
    allow_shorter: bool,
    pre_len: usize,
    max_pre: usize,
    probe: u64,
    solution: Option<Solution>,
}

impl<'a> Search<'a> {
    #[must_use]
    pub fn new(tables: &'a Tables, options: &SearchOptions) -> Self {
        let mut options = options.clone();
        options.min_probes = options.min_probes.min(options.max_probes);
        Self {
            tables,
            moves: vec![0; options.max_depth + 1],
            phase1_cubes: vec![CubieCube::SOLVED; options.max_depth + 2],
            options,
            pre_moves: [0; MAX_PRE_MOVES],
            urf_cubes: [CubieCube::SOLVED; 6],
            urf_ssym: [0; 6],
            urf_idx: 0,
            length1: 0,
            depth1: 0,
            max_dep2: 0,
            sol_len: 0,
            valid1: 0,
            allow_shorter: false,
            pre_len: 0,
            max_pre: 0,
            probe: 0,
            solution: None,
        }
    }

    /// Finds a solution of at most `max_depth` moves.
    ///
    /// # Errors
    ///
    /// Fails if the cube is not solvable, if no solution within the depth
    /// limit exists, or if the probe budget ran out first.
    pub fn solve_cube(&mut self, cube: &CubieCube) -> Result<Solution, SolveError> {
        cube.verify()?;

        let self_sym = cube.self_symmetries();
        let conj_mask = (if self.options.try_inverse { 0 } else { 0x38 })
            | (if self.options.try_all_axes { 0 } else { 0x36 })
            | self_sym.conjugate_mask();
        self.max_pre = if conj_mask > 7 { 0 } else { MAX_PRE_MOVES };

        let mut cc = *cube;
        for i in 0..6 {
            self.urf_cubes[i] = cc;
            self.urf_ssym[i] = cc.self_symmetries().plain();
            cc = cc.urf_conjugate();
            if i % 3 == 2 {
                cc = cc.inverse();
            }
        }

        self.sol_len = self.options.max_depth + 1;
        self.probe = 0;
        self.solution = None;

        self.length1 = 0;
        while self.length1 < self.sol_len {
            self.max_dep2 = MAX_DEPTH2.min(self.sol_len - self.length1);
            for urf_idx in 0..6 {
                if conj_mask >> urf_idx & 1 != 0 {
                    continue;
                }
                self.urf_idx = urf_idx;
                let (cube, ssym) = (self.urf_cubes[urf_idx], self.urf_ssym[urf_idx]);
                if self.phase1_premoves(self.max_pre, -30, &cube, ssym) == Outcome::Stop {
                    return self.finish(SolveError::ProbeLimit {
                        max_probes: self.options.max_probes,
                    });
                }
            }
            self.length1 += 1;
        }

        self.finish(SolveError::NoSolution {
            max_depth: self.options.max_depth,
        })
    }

    fn finish(&mut self, otherwise: SolveError) -> Result<Solution, SolveError> {
        match &self.solution {
            Some(solution) => debug!(
                "Search kept a {} move solution from URF frame {} after {} probes",
                solution.len(),
                self.urf_idx,
                self.probe
            ),
            None => debug!(
                "Search gave up after {} probes at phase 1 length {}",
                self.probe, self.length1
            ),
        }
        self.solution.take().ok_or(otherwise)
    }

    /// Tries every sequence of up to `maxl` more pre-moves before phase 1,
    /// starting with none at all.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn phase1_premoves(&mut self, maxl: usize, lm: i32, cc: &CubieCube, ssym: u16) -> Outcome {
        self.pre_len = self.max_pre - maxl;
        if self.pre_len == 0 || PRE_MOVE_TAIL_SKIP >> lm & 1 == 0 {
            self.depth1 = self.length1 - self.pre_len;
            self.phase1_cubes[0] = *cc;
            self.valid1 = 0;
            self.allow_shorter = self.depth1 == MIN_P1_LENGTH_PRE && self.pre_len != 0;
            let node = Phase1Node::new(self.tables, cc);
            if node.prun <= self.depth1
                && self.phase1(node, ssym, self.depth1, -1) == Outcome::Stop
            {
                return Outcome::Stop;
            }
        }

        if maxl == 0 || self.pre_len + MIN_P1_LENGTH_PRE >= self.length1 {
            return Outcome::Continue;
        }

        let mut skip = SYMMETRIES.skip_moves(ssym);
        if maxl == 1 || self.pre_len + 1 + MIN_P1_LENGTH_PRE >= self.length1 {
            skip |= PRE_MOVE_TAIL_SKIP;
        }

        let lm = lm / 3 * 3;
        let mut m = 0;
        while m < N_MOVES as i32 {
            if m == lm || m == lm - 9 || m == lm + 9 {
                m += 3;
                continue;
            }
            if skip >> m & 1 != 0 {
                m += 1;
                continue;
            }
            let pre = MOVE_CUBES[m as usize].multiply(cc);
            self.pre_moves[self.max_pre - maxl] = m as u8;
            let ssym = ssym & SYMMETRIES.move_self_sym[m as usize];
            if self.phase1_premoves(maxl - 1, m, &pre, ssym) == Outcome::Stop {
                return Outcome::Stop;
            }
            m += 1;
        }
        Outcome::Continue
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn phase1(&mut self, node: Phase1Node, ssym: u16, maxl: usize, lm: i32) -> Outcome {
        if node.prun == 0 && maxl < 5 {
            if self.allow_shorter || maxl == 0 {
                self.depth1 -= maxl;
                let outcome = self.init_phase2_pre();
                self.depth1 += maxl;
                return outcome;
            }
            return Outcome::Continue;
        }

        let skip = SYMMETRIES.skip_moves(ssym);
        for axis in (0..N_MOVES).step_by(3) {
            let axis_i = axis as i32;
            if axis_i == lm || axis_i == lm - 9 {
                continue;
            }
            for m in axis..axis + 3 {
                if skip >> m & 1 != 0 {
                    continue;
                }
                let child = node.apply(self.tables, m);
                if child.prun > maxl {
                    break;
                } else if child.prun == maxl {
                    continue;
                }

                let at = self.depth1 - maxl;
                self.moves[at] = m as u8;
                self.valid1 = self.valid1.min(at);
                let ssym = ssym & SYMMETRIES.move_self_sym[m];
                match self.phase1(child, ssym, maxl - 1, axis_i) {
                    Outcome::Stop => return Outcome::Stop,
                    Outcome::SkipAxis => break,
                    Outcome::Continue => {}
                }
            }
        }
        Outcome::Continue
    }

    /// Hands the end of phase 1 to phase 2, then tries again with the last
    /// pre-move inverted.
    fn init_phase2_pre(&mut self) -> Outcome {
        let limit = if self.solution.is_some() {
            self.options.min_probes
        } else {
            self.options.max_probes
        };
        if self.probe >= limit {
            return Outcome::Stop;
        }
        self.probe += 1;

        for i in self.valid1..self.depth1 {
            self.phase1_cubes[i + 1] =
                self.phase1_cubes[i].multiply(&MOVE_CUBES[usize::from(self.moves[i])]);
        }
        self.valid1 = self.depth1;

        let cube = self.phase1_cubes[self.depth1];
        let outcome = self.init_phase2(&cube);
        if outcome != Outcome::Continue || self.pre_len == 0 {
            return outcome;
        }

        // A quarter pre-move and its inverse differ by a half turn of the
        // same face, which phase 2 is free to absorb
        let last = self.pre_len - 1;
        let half = usize::from(self.pre_moves[last] / 3 * 3 + 1);
        let flipped = MOVE_CUBES[half].multiply(&cube);
        let saved = self.pre_moves[last];
        self.pre_moves[last] = saved / 3 * 3 + 2 - saved % 3;
        let outcome = self.init_phase2(&flipped);
        self.pre_moves[last] = saved;
        outcome
    }

    fn init_phase2(&mut self, cube: &CubieCube) -> Outcome {
        let tables = self.tables;
        let corner = usize::from(tables.perm.corner_perm_sym(cube));
        let (corner, csym) = (corner >> 4, corner & 0xf);
        let edge = usize::from(tables.perm.edge_perm_sym(cube));
        let (edge, esym) = (edge >> 4, edge & 0xf);
        let mid = usize::from(cube.mid_perm());

        let edgei = tables.perm_sym_inv(edge, esym, false);
        let corni = tables.perm_sym_inv(corner, csym, true);
        let prun = usize::from(
            tables
                .edge_comb_bound(edgei >> 4, edgei & 0xf, corni >> 4, corni & 0xf)
                .max(tables.phase2_bound(edge, esym, corner, csym, mid)),
        );
        if prun >= self.max_dep2 {
            return if prun > self.max_dep2 {
                Outcome::SkipAxis
            } else {
                Outcome::Continue
            };
        }

        let mut found = false;
        let mut limit = self.max_dep2;
        while limit > prun {
            let Some(spare) =
                self.phase2(edge, esym, corner, csym, mid, limit - 1, self.depth1, NO_UD_MOVE)
            else {
                break;
            };
            let depth2 = limit - 1 - spare;
            self.record_solution(depth2);
            found = true;
            limit = depth2;
        }

        if found {
            self.max_dep2 = MAX_DEPTH2.min(self.sol_len.saturating_sub(self.length1));
            if self.probe >= self.options.min_probes {
                return Outcome::Stop;
            }
        }
        Outcome::Continue
    }

    fn record_solution(&mut self, depth2: usize) {
        let (found, phase1_len) = join_phases(
            &self.moves[..self.depth1],
            self.moves[self.depth1..self.depth1 + depth2]
                .iter()
                .chain(self.pre_moves[..self.pre_len].iter().rev()),
        );
        self.sol_len = found.len();

        let solution = Solution::new(&found, self.urf_idx, phase1_len, self.options.format);
        trace!(
            "Found {} move solution on URF frame {} after {} probes: {}",
            solution.len(),
            self.urf_idx,
            self.probe,
            solution
        );
        self.solution = Some(solution);
    }

    /// Depth-first search over the phase 2 moves. Returns the number of
    /// moves left unused out of `maxl` when the cube was solved.
    #[allow(clippy::too_many_arguments)]
    fn phase2(
        &mut self,
        edge: usize,
        esym: usize,
        corner: usize,
        csym: usize,
        mid: usize,
        maxl: usize,
        depth: usize,
        lm: usize,
    ) -> Option<usize> {
        if edge == 0 && corner == 0 && mid == 0 {
            return Some(maxl);
        }

        let tables = self.tables;
        let mask = CANONICAL_UD[lm];
        let mut m = 0;
        while m < N_MOVES2 {
            if mask >> m & 1 != 0 {
                m += (UD_TRIPLE_JUMP >> m & 3) + 1;
                continue;
            }

            let midx = tables.mid_perm_move.get(mid, m);
            let cornx = tables
                .corner_perm_move
                .get(corner, usize::from(SYMMETRIES.sym_move_ud[csym][m]));
            let csymx = usize::from(SYMMETRIES.mult[cornx & 0xf][csym]);
            let cornx = cornx >> 4;
            let edgex = tables
                .edge_perm_move
                .get(edge, usize::from(SYMMETRIES.sym_move_ud[esym][m]));
            let esymx = usize::from(SYMMETRIES.mult[edgex & 0xf][esym]);
            let edgex = edgex >> 4;

            let edgei = tables.perm_sym_inv(edgex, esymx, false);
            let corni = tables.perm_sym_inv(cornx, csymx, true);
            let mut prun = usize::from(tables.edge_comb_bound(
                edgei >> 4,
                edgei & 0xf,
                corni >> 4,
                corni & 0xf,
            ));
            if prun < maxl {
                prun = usize::from(tables.phase2_bound(edgex, esymx, cornx, csymx, midx));
            }
            if prun >= maxl {
                // Exceeding the bound also rules out the later powers of
                // this face
                m += (UD_TRIPLE_JUMP >> m & 3 & maxl.wrapping_sub(prun)) + 1;
                continue;
            }

            if let Some(spare) =
                self.phase2(edgex, esymx, cornx, csymx, midx, maxl - 1, depth + 1, m)
            {
                self.moves[depth] = UD_TO_STD[m];
                return Some(spare);
            }
            m += 1;
        }
        None
    }
}

/// Concatenates the phase 1 moves with the rest of a solution. Returns the
/// normalized sequence and how many of its moves are left of phase 1 once
/// the moves at the boundary have merged or cancelled.
fn join_phases<'m>(
    phase1: &[u8],
    rest: impl IntoIterator<Item = &'m u8>,
) -> (MoveSequence, usize) {
    let mut found = MoveSequence::new();
    for &m in phase1 {
        found.push(Move::from_index(m));
    }
    let mut phase1_len = found.len();
    for &m in rest {
        found.push(Move::from_index(m));
        phase1_len = phase1_len.min(found.len());
    }
    (found, phase1_len)
}
