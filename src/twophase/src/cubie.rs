//! The cubie-level representation of a cube state along with its group
//! operations and the raw coordinates the search projects it onto.

use crate::{
    math::{
        combination_rank, combination_unrank, parity_of, permutation_parity, permutation_rank,
        permutation_unrank,
    },
    moves::{MOVE_CUBES, Move, MoveSequence},
    symmetry::{SYMMETRIES, SelfSymmetry, URF, URF_INV},
};
use std::fmt;
use thiserror::Error;

pub const N_TWIST: usize = 2187;
pub const N_FLIP: usize = 2048;
pub const N_SLICE: usize = 495;
pub const N_PERM: usize = 40320;
pub const N_MPERM: usize = 24;
pub const N_COMB: usize = 140;

/// A cube state as a permutation of the 8 corners and 12 edges.
///
/// Each corner slot holds `piece | orientation << 3`. Orientations 3..=5 only
/// appear in mirrored symmetry elements and compose with the mirrored rule of
/// [`CubieCube::multiply`]. Each edge slot holds `piece << 1 | flip`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CubieCube {
    pub(crate) corners: [u8; 8],
    pub(crate) edges: [u8; 12],
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    Corner,
    Edge,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Corner => f.write_str("corner"),
            PieceKind::Edge => f.write_str("edge"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCubeError {
    #[error("Every {0} must appear exactly once")]
    PieceCount(PieceKind),
    #[error("A corner has an orientation outside of 0..=2")]
    OrientationRange,
    #[error("The {0} orientations do not sum to a solvable total")]
    OrientationParity(PieceKind),
    #[error("The corner and edge permutations have different parities")]
    PermutationParity,
}

impl Default for CubieCube {
    fn default() -> Self {
        Self::SOLVED
    }
}

impl CubieCube {
    pub const SOLVED: Self = Self::from_pieces(
        [0, 1, 2, 3, 4, 5, 6, 7],
        [0; 8],
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        [0; 12],
    );

    /// Builds a cube from its corner permutation and orientation and its
    /// edge permutation and flip.
    #[must_use]
    pub const fn from_pieces(cp: [u8; 8], co: [u8; 8], ep: [u8; 12], eo: [u8; 12]) -> Self {
        let mut corners = [0; 8];
        let mut i = 0;
        while i < 8 {
            corners[i] = cp[i] | co[i] << 3;
            i += 1;
        }
        let mut edges = [0; 12];
        let mut i = 0;
        while i < 12 {
            edges[i] = ep[i] << 1 | eo[i];
            i += 1;
        }
        Self { corners, edges }
    }

    /// The state reached by applying `other` after `self`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut product = Self::SOLVED;
        for (slot, &b) in product.corners.iter_mut().zip(&other.corners) {
            let a = self.corners[usize::from(b & 7)];
            let ori_a = a >> 3;
            let ori_b = b >> 3;
            let mut ori = (ori_a + if ori_a < 3 { ori_b } else { 6 - ori_b }) % 3;
            if (ori_a < 3) != (ori_b < 3) {
                ori += 3;
            }
            *slot = a & 7 | ori << 3;
        }
        for (slot, &b) in product.edges.iter_mut().zip(&other.edges) {
            *slot = self.edges[usize::from(b >> 1)] ^ (b & 1);
        }
        product
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inverse = Self::SOLVED;
        for (i, &e) in (0_u8..).zip(&self.edges) {
            inverse.edges[usize::from(e >> 1)] = i << 1 | e & 1;
        }
        for (i, &c) in (0_u8..).zip(&self.corners) {
            let ori = c >> 3;
            let ori = if ori < 3 { (3 - ori) % 3 } else { ori };
            inverse.corners[usize::from(c & 7)] = i | ori << 3;
        }
        inverse
    }

    /// Computes `s_inv · self · s`. The state itself must not be mirrored;
    /// `s` may be.
    pub(crate) fn conjugate_by(&self, s: &Self, s_inv: &Self) -> Self {
        let mut out = Self::SOLVED;
        for (slot, &sc) in out.corners.iter_mut().zip(&s.corners) {
            let through = self.corners[usize::from(sc & 7)];
            let back = s_inv.corners[usize::from(through & 7)];
            let ori_b = through >> 3;
            let ori = if back >> 3 < 3 { ori_b } else { (3 - ori_b) % 3 };
            *slot = back & 7 | ori << 3;
        }
        for (slot, &se) in out.edges.iter_mut().zip(&s.edges) {
            let through = self.edges[usize::from(se >> 1)];
            *slot = s_inv.edges[usize::from(through >> 1)] ^ (through & 1) ^ (se & 1);
        }
        out
    }

    /// Conjugates by one of the 16 reduction symmetries: `S⁻¹ · self · S`.
    #[must_use]
    pub fn conjugate(&self, sym: usize) -> Self {
        SYMMETRIES.conjugate(self, sym)
    }

    /// Rotates the cube's frame 120° about the URF-DBL diagonal.
    #[must_use]
    pub fn urf_conjugate(&self) -> Self {
        URF_INV.multiply(self).multiply(&URF)
    }

    /// Every way the 16 reduction symmetries, the URF rotations, and inversion
    /// map this state onto itself.
    #[must_use]
    pub fn self_symmetries(&self) -> SelfSymmetry {
        SYMMETRIES.self_symmetries(self)
    }

    /// Checks that this state is reachable by face turns.
    ///
    /// # Errors
    ///
    /// Returns the first structural defect found.
    pub fn verify(&self) -> Result<(), InvalidCubeError> {
        let mut edge_mask = 0_u16;
        let mut flips = 0;
        for &e in &self.edges {
            if e >> 1 >= 12 {
                return Err(InvalidCubeError::PieceCount(PieceKind::Edge));
            }
            edge_mask |= 1 << (e >> 1);
            flips ^= e & 1;
        }
        if edge_mask != 0xfff {
            return Err(InvalidCubeError::PieceCount(PieceKind::Edge));
        }
        if flips != 0 {
            return Err(InvalidCubeError::OrientationParity(PieceKind::Edge));
        }

        let mut corner_mask = 0_u8;
        let mut twists = 0;
        for &c in &self.corners {
            corner_mask |= 1 << (c & 7);
            if c >> 3 > 2 {
                return Err(InvalidCubeError::OrientationRange);
            }
            twists += c >> 3;
        }
        if corner_mask != 0xff {
            return Err(InvalidCubeError::PieceCount(PieceKind::Corner));
        }
        if twists % 3 != 0 {
            return Err(InvalidCubeError::OrientationParity(PieceKind::Corner));
        }

        let edge_parity = parity_of(&self.edge_pieces());
        let corner_parity = permutation_parity(u32::from(self.corner_perm()), 8);
        if edge_parity != corner_parity {
            return Err(InvalidCubeError::PermutationParity);
        }
        Ok(())
    }

    fn corner_pieces(&self) -> [u8; 8] {
        self.corners.map(|c| c & 7)
    }

    fn edge_pieces(&self) -> [u8; 12] {
        self.edges.map(|e| e >> 1)
    }

    fn set_corner_pieces(&mut self, pieces: &[u8]) {
        for (slot, &piece) in self.corners.iter_mut().zip(pieces) {
            *slot = *slot & 0xf8 | piece;
        }
    }

    fn set_edge_pieces(&mut self, pieces: &[u8]) {
        for (slot, &piece) in self.edges.iter_mut().zip(pieces) {
            *slot = piece << 1 | *slot & 1;
        }
    }

    /// Corner orientation of the first seven corners in base 3.
    #[must_use]
    pub fn twist(&self) -> u16 {
        self.corners[..7]
            .iter()
            .fold(0, |twist, &c| twist * 3 + u16::from(c >> 3))
    }

    /// Sets the corner orientations, deriving the last corner's so that the
    /// total stays a multiple of 3.
    pub fn set_twist(&mut self, mut twist: u16) {
        let mut total = 15;
        for slot in self.corners[..7].iter_mut().rev() {
            #[allow(clippy::cast_possible_truncation)]
            let ori = (twist % 3) as u8;
            total -= ori;
            *slot = *slot & 7 | ori << 3;
            twist /= 3;
        }
        self.corners[7] = self.corners[7] & 7 | (total % 3) << 3;
    }

    /// Flips of the first eleven edges in binary.
    #[must_use]
    pub fn flip(&self) -> u16 {
        self.edges[..11]
            .iter()
            .fold(0, |flip, &e| flip << 1 | u16::from(e & 1))
    }

    /// Sets the edge flips, deriving the last edge's so that the total stays
    /// even.
    pub fn set_flip(&mut self, mut flip: u16) {
        let mut parity = 0;
        for slot in self.edges[..11].iter_mut().rev() {
            #[allow(clippy::cast_possible_truncation)]
            let bit = (flip & 1) as u8;
            parity ^= bit;
            *slot = *slot & !1 | bit;
            flip >>= 1;
        }
        self.edges[11] = self.edges[11] & !1 | parity;
    }

    /// The positions of the four E-slice edges; zero when they are all home.
    #[must_use]
    pub fn ud_slice(&self) -> u16 {
        494 - combination_rank(&self.edge_pieces(), 8)
    }

    pub fn set_ud_slice(&mut self, slice: u16) {
        let mut pieces = [0; 12];
        combination_unrank(494 - slice, 8, &mut pieces);
        self.set_edge_pieces(&pieces);
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn corner_perm(&self) -> u16 {
        permutation_rank(&self.corner_pieces()) as u16
    }

    pub fn set_corner_perm(&mut self, perm: u16) {
        let mut pieces = [0; 8];
        permutation_unrank(u32::from(perm), &mut pieces);
        self.set_corner_pieces(&pieces);
    }

    /// Permutation of the eight U and D layer edges. Only meaningful once the
    /// E-slice edges are in the E-slice.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn edge_perm(&self) -> u16 {
        permutation_rank(&self.edge_pieces()[..8]) as u16
    }

    pub fn set_edge_perm(&mut self, perm: u16) {
        let mut pieces = [0; 8];
        permutation_unrank(u32::from(perm), &mut pieces);
        self.set_edge_pieces(&pieces);
    }

    /// Permutation of the four E-slice edges among themselves.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mid_perm(&self) -> u16 {
        (permutation_rank(&self.edge_pieces()) % 24) as u16
    }

    pub fn set_mid_perm(&mut self, perm: u16) {
        let mut pieces = [0; 12];
        permutation_unrank(u32::from(perm), &mut pieces);
        self.set_edge_pieces(&pieces);
    }

    /// The positions of the four U layer corners.
    #[must_use]
    pub fn corner_comb(&self) -> u16 {
        combination_rank(&self.corner_pieces(), 0)
    }

    pub fn set_corner_comb(&mut self, comb: u16) {
        let mut pieces = [0; 8];
        combination_unrank(comb, 0, &mut pieces);
        self.set_corner_pieces(&pieces);
    }

    /// [`CubieCube::corner_comb`] extended with the corner permutation
    /// parity in the upper half of the domain.
    #[must_use]
    pub fn corner_comb_parity(&self) -> u16 {
        let parity = permutation_parity(u32::from(self.corner_perm()), 8);
        self.corner_comb() + 70 * u16::from(parity)
    }

    /// A uniformly random solvable state.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let mut cube = Self::SOLVED;
        cube.set_corner_perm(rng.u16(..N_PERM as u16));

        let mut edges = [0; 12];
        permutation_unrank(rng.u32(..479_001_600), &mut edges);
        cube.set_edge_pieces(&edges);
        if parity_of(&edges) != permutation_parity(u32::from(cube.corner_perm()), 8) {
            cube.edges.swap(10, 11);
        }

        cube.set_twist(rng.u16(..N_TWIST as u16));
        cube.set_flip(rng.u16(..N_FLIP as u16));
        cube
    }

    #[must_use]
    pub fn apply_move(&self, mv: Move) -> Self {
        self.multiply(&MOVE_CUBES[mv.index()])
    }

    #[must_use]
    pub fn apply_moves(&self, moves: &MoveSequence) -> Self {
        moves
            .iter()
            .fold(*self, |cube, &mv| cube.apply_move(mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Face;

    fn coordinates(cube: &CubieCube) -> (u16, u16, u32, u16) {
        (
            cube.corner_perm(),
            cube.twist(),
            permutation_rank(&cube.edge_pieces()),
            cube.flip(),
        )
    }

    #[test]
    fn face_turns_have_known_coordinates() {
        let expected = [
            (Face::U, (15120, 0, 119_750_400, 0)),
            (Face::R, (21021, 1494, 323_403_417, 0)),
            (Face::F, (8064, 1236, 29_441_808, 550)),
            (Face::D, (9, 0, 5880, 0)),
            (Face::L, (1230, 412, 2_949_660, 0)),
            (Face::B, (224, 137, 328_552, 137)),
        ];
        for (face, coords) in expected {
            let cube = CubieCube::SOLVED.apply_move(Move::new(face, 1));
            assert_eq!(coordinates(&cube), coords, "{face:?}");
            cube.verify().unwrap();
        }
    }

    #[test]
    fn quarter_turns_have_order_four() {
        for face in Face::ALL {
            let mv = Move::new(face, 1);
            let cube = (0..4).fold(CubieCube::SOLVED, |cube, _| cube.apply_move(mv));
            assert_eq!(cube, CubieCube::SOLVED);
        }
    }

    #[test]
    fn inverse_undoes_state() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            let cube = CubieCube::random(&mut rng);
            cube.verify().unwrap();
            assert_eq!(cube.multiply(&cube.inverse()), CubieCube::SOLVED);
            assert_eq!(cube.inverse().multiply(&cube), CubieCube::SOLVED);
        }
    }

    #[test]
    fn urf_conjugation_has_order_three() {
        let mut rng = fastrand::Rng::with_seed(11);
        let cube = CubieCube::random(&mut rng);
        let once = cube.urf_conjugate();
        assert_ne!(once, cube);
        assert_eq!(once.urf_conjugate().urf_conjugate(), cube);
        once.verify().unwrap();
    }

    #[test]
    fn coordinate_setters_round_trip() {
        let mut cube = CubieCube::SOLVED;
        for twist in 0..N_TWIST as u16 {
            cube.set_twist(twist);
            assert_eq!(cube.twist(), twist);
        }
        for flip in 0..N_FLIP as u16 {
            cube.set_flip(flip);
            assert_eq!(cube.flip(), flip);
        }
        for slice in 0..N_SLICE as u16 {
            cube.set_ud_slice(slice);
            assert_eq!(cube.ud_slice(), slice);
        }
        for perm in (0..N_PERM as u16).step_by(13) {
            cube.set_corner_perm(perm);
            assert_eq!(cube.corner_perm(), perm);
            cube.set_edge_perm(perm);
            assert_eq!(cube.edge_perm(), perm);
        }
        for mid in 0..N_MPERM as u16 {
            cube.set_mid_perm(mid);
            assert_eq!(cube.mid_perm(), mid);
        }
        for comb in 0..70 {
            cube.set_corner_comb(comb);
            assert_eq!(cube.corner_comb(), comb);
        }
    }

    #[test]
    fn solved_coordinates_are_zero() {
        let cube = CubieCube::SOLVED;
        assert_eq!(cube.twist(), 0);
        assert_eq!(cube.flip(), 0);
        assert_eq!(cube.ud_slice(), 0);
        assert_eq!(cube.corner_perm(), 0);
        assert_eq!(cube.edge_perm(), 0);
        assert_eq!(cube.mid_perm(), 0);
        assert_eq!(cube.corner_comb_parity(), 0);
    }

    #[test]
    fn verify_reports_each_defect() {
        let mut cube = CubieCube::SOLVED;
        cube.edges[0] = cube.edges[1];
        assert_eq!(
            cube.verify(),
            Err(InvalidCubeError::PieceCount(PieceKind::Edge))
        );

        let mut cube = CubieCube::SOLVED;
        cube.edges[0] ^= 1;
        assert_eq!(
            cube.verify(),
            Err(InvalidCubeError::OrientationParity(PieceKind::Edge))
        );

        let mut cube = CubieCube::SOLVED;
        cube.corners[3] = cube.corners[4];
        assert_eq!(
            cube.verify(),
            Err(InvalidCubeError::PieceCount(PieceKind::Corner))
        );

        let mut cube = CubieCube::SOLVED;
        cube.corners[0] |= 1 << 3;
        assert_eq!(
            cube.verify(),
            Err(InvalidCubeError::OrientationParity(PieceKind::Corner))
        );

        let mut cube = CubieCube::SOLVED;
        cube.corners[0] |= 3 << 3;
        assert_eq!(cube.verify(), Err(InvalidCubeError::OrientationRange));

        let mut cube = CubieCube::SOLVED;
        cube.edges.swap(0, 1);
        assert_eq!(cube.verify(), Err(InvalidCubeError::PermutationParity));
    }

    #[test]
    fn corner_comb_parity_tracks_quarter_turns() {
        let cube = CubieCube::SOLVED.apply_move(Move::new(Face::U, 1));
        assert_eq!(cube.corner_comb_parity(), cube.corner_comb() + 70);
        let cube = cube.apply_move(Move::new(Face::U, 1));
        assert_eq!(cube.corner_comb_parity(), cube.corner_comb());
    }
}
