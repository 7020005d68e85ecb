use crate::cubie::CubieCube;
use std::{fmt, str::FromStr, sync::LazyLock};
use thiserror::Error;

pub const N_MOVES: usize = 18;
pub const N_MOVES2: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'U' => Face::U,
            'R' => Face::R,
            'F' => Face::F,
            'D' => Face::D,
            'L' => Face::L,
            'B' => Face::B,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_char(self) -> char {
        b"URFDLB"[self as usize] as char
    }
}

/// A face turn, indexed as `face * 3 + turns - 1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move(u8);

impl Move {
    /// `turns` counts clockwise quarter turns and must be 1, 2, or 3.
    #[must_use]
    pub fn new(face: Face, turns: u8) -> Self {
        assert!((1..=3).contains(&turns), "A move turns its face 1 to 3 times");
        Self(face as u8 * 3 + turns - 1)
    }

    pub(crate) const fn from_index(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn face(self) -> Face {
        Face::ALL[usize::from(self.0 / 3)]
    }

    #[must_use]
    pub fn turns(self) -> u8 {
        self.0 % 3 + 1
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self(self.0 / 3 * 3 + 2 - self.0 % 3)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = ["", "2", "'"][usize::from(self.0 % 3)];
        write!(f, "{}{suffix}", self.face().as_char())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Unknown move `{0}`")]
    UnknownMove(String),
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || MoveParseError::UnknownMove(s.to_owned());
        let mut chars = s.chars();
        let face = chars.next().and_then(Face::from_char).ok_or_else(unknown)?;
        let turns = match chars.as_str() {
            "" => 1,
            "2" | "2'" | "'2" => 2,
            "'" => 3,
            _ => return Err(unknown()),
        };
        Ok(Move::new(face, turns))
    }
}

/// A sequence of moves. Sequences built through [`MoveSequence::push`] never
/// turn the same face twice in a row, even across an opposite face turn.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MoveSequence(Vec<Move>);

impl MoveSequence {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a move, folding it into the previous turn of the same face.
    pub fn push(&mut self, mv: Move) {
        let cur = mv.0;
        let Some(&Move(last)) = self.0.last() else {
            self.0.push(mv);
            return;
        };

        let axis = cur / 3;
        if axis == last / 3 {
            let turns = (cur % 3 + last % 3 + 1) % 4;
            if turns == 3 {
                self.0.pop();
            } else if let Some(slot) = self.0.last_mut() {
                *slot = Move(axis * 3 + turns);
            }
            return;
        }

        let len = self.0.len();
        if len > 1 && axis % 3 == (last / 3) % 3 && axis == self.0[len - 2].0 / 3 {
            let turns = (cur % 3 + self.0[len - 2].0 % 3 + 1) % 4;
            if turns == 3 {
                self.0.remove(len - 2);
            } else {
                self.0[len - 2] = Move(axis * 3 + turns);
            }
            return;
        }

        self.0.push(mv);
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        Self(self.0.iter().rev().map(|mv| mv.inverse()).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.0
    }
}

impl From<Vec<Move>> for MoveSequence {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for MoveSequence {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}

/// A random sequence in which consecutive moves never share an axis.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn random_scramble(len: usize, rng: &mut fastrand::Rng) -> MoveSequence {
    let mut moves = Vec::with_capacity(len);
    let mut last_axis = None;
    while moves.len() < len {
        let face = rng.u8(..6);
        if last_axis == Some(face % 3) {
            continue;
        }
        last_axis = Some(face % 3);
        moves.push(Move(face * 3 + rng.u8(..3)));
    }
    MoveSequence(moves)
}

const FACE_TURNS: [CubieCube; 6] = [
    CubieCube::from_pieces(
        [3, 0, 1, 2, 4, 5, 6, 7],
        [0; 8],
        [3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
        [0; 12],
    ),
    CubieCube::from_pieces(
        [4, 1, 2, 0, 7, 5, 6, 3],
        [2, 0, 0, 1, 1, 0, 0, 2],
        [8, 1, 2, 3, 11, 5, 6, 7, 4, 9, 10, 0],
        [0; 12],
    ),
    CubieCube::from_pieces(
        [1, 5, 2, 3, 0, 4, 6, 7],
        [1, 2, 0, 0, 2, 1, 0, 0],
        [0, 9, 2, 3, 4, 8, 6, 7, 1, 5, 10, 11],
        [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    ),
    CubieCube::from_pieces(
        [0, 1, 2, 3, 5, 6, 7, 4],
        [0; 8],
        [0, 1, 2, 3, 5, 6, 7, 4, 8, 9, 10, 11],
        [0; 12],
    ),
    CubieCube::from_pieces(
        [0, 2, 6, 3, 4, 1, 5, 7],
        [0, 1, 2, 0, 0, 2, 1, 0],
        [0, 1, 10, 3, 4, 5, 9, 7, 8, 2, 6, 11],
        [0; 12],
    ),
    CubieCube::from_pieces(
        [0, 1, 3, 7, 4, 5, 2, 6],
        [0, 0, 1, 2, 0, 0, 2, 1],
        [0, 1, 2, 11, 4, 5, 6, 10, 8, 9, 3, 7],
        [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    ),
];

/// The cube reached from solved by each of the 18 moves.
pub static MOVE_CUBES: LazyLock<[CubieCube; N_MOVES]> = LazyLock::new(|| {
    let mut cubes = [CubieCube::SOLVED; N_MOVES];
    for (face, turn) in FACE_TURNS.iter().enumerate() {
        let mut cube = *turn;
        for power in 0..3 {
            cubes[face * 3 + power] = cube;
            cube = cube.multiply(turn);
        }
    }
    cubes
});

/// Phase 2 move indices first, then the quarter turns phase 2 forbids.
pub const UD_TO_STD: [u8; N_MOVES] = [0, 1, 2, 4, 7, 9, 10, 11, 13, 16, 3, 5, 6, 8, 12, 14, 15, 17];

pub const STD_TO_UD: [u8; N_MOVES] = {
    let mut table = [0; N_MOVES];
    let mut i = 0;
    while i < N_MOVES {
        table[UD_TO_STD[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// `CANONICAL_UD[last]` has bit `m` set when phase 2 move `m` may not follow
/// `last`: it turns the same face, or it turns the opposite face and has the
/// smaller axis. Index 10 stands for "no previous move".
pub const CANONICAL_UD: [u16; N_MOVES2 + 1] = {
    let mut table = [0; N_MOVES2 + 1];
    let mut i = 0;
    while i < N_MOVES2 {
        let ix = UD_TO_STD[i] / 3;
        let mut j = 0;
        while j < N_MOVES2 {
            let jx = UD_TO_STD[j] / 3;
            if ix == jx || (ix % 3 == jx % 3 && ix >= jx) {
                table[i] |= 1 << j;
            }
            j += 1;
        }
        i += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> MoveSequence {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_prints_moves() {
        let moves = seq("U R2 F' D2' L'2 B");
        assert_eq!(moves.to_string(), "U R2 F' D2 L2 B");
        assert_eq!(moves.len(), 6);
        assert!(seq("   ").is_empty());
        assert_eq!(
            "U X".parse::<MoveSequence>(),
            Err(MoveParseError::UnknownMove("X".to_owned()))
        );
        assert!("U3".parse::<MoveSequence>().is_err());
    }

    #[test]
    fn parsing_keeps_repeats() {
        assert_eq!(seq("U U").len(), 2);
    }

    #[test]
    fn push_folds_same_face_turns() {
        let mut moves = MoveSequence::new();
        for &mv in &seq("R U U") {
            moves.push(mv);
        }
        assert_eq!(moves.to_string(), "R U2");

        moves.push("U2".parse().unwrap());
        assert_eq!(moves.to_string(), "R");

        moves.push("R'".parse().unwrap());
        assert!(moves.is_empty());
    }

    #[test]
    fn push_merges_across_opposite_face() {
        let mut moves = MoveSequence::new();
        for &mv in &seq("U D U") {
            moves.push(mv);
        }
        assert_eq!(moves.to_string(), "U2 D");

        let mut moves = MoveSequence::new();
        for &mv in &seq("F U D U'") {
            moves.push(mv);
        }
        assert_eq!(moves.to_string(), "F D");
    }

    #[test]
    fn inverse_reverses_and_inverts() {
        assert_eq!(seq("R U2 F'").inverse().to_string(), "F U2 R'");
    }

    #[test]
    fn std_and_ud_indices_are_inverse() {
        for i in 0..N_MOVES {
            assert_eq!(usize::from(STD_TO_UD[usize::from(UD_TO_STD[i])]), i);
        }
        assert_eq!(CANONICAL_UD[N_MOVES2], 0);
        // D may follow U
        assert_eq!(CANONICAL_UD[0] & 0b111, 0b111);
        assert_eq!(CANONICAL_UD[0] & 0b1110_0000, 0);
        // but U may not follow D
        assert_eq!(CANONICAL_UD[5] & 0b1110_0111, 0b1110_0111);
    }

    #[test]
    fn random_scrambles_alternate_axes() {
        let mut rng = fastrand::Rng::with_seed(5);
        let moves = random_scramble(40, &mut rng);
        assert_eq!(moves.len(), 40);
        for pair in moves.as_slice().windows(2) {
            assert_ne!(pair[0].face() as u8 % 3, pair[1].face() as u8 % 3);
        }
    }
}
