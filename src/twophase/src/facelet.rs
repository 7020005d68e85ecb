//! Conversion between cube states and the 54-sticker facelet notation.
//!
//! Faces are listed in U, R, F, D, L, B order, nine stickers each, read row
//! by row as seen from the front of that face. Any six distinct characters
//! may be used as colors; the center stickers define which is which.

use crate::{
    cubie::CubieCube,
    moves::{Face, MoveSequence},
};
use thiserror::Error;

pub const SOLVED_FACELETS: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

const CENTERS: [usize; 6] = [4, 13, 22, 31, 40, 49];

/// The stickers of each corner slot, starting from its U or D sticker and
/// going clockwise.
const CORNER_FACELETS: [[usize; 3]; 8] = [
    [8, 9, 20],
    [6, 18, 38],
    [0, 36, 47],
    [2, 45, 11],
    [29, 26, 15],
    [27, 44, 24],
    [33, 53, 42],
    [35, 17, 51],
];

const EDGE_FACELETS: [[usize; 2]; 12] = [
    [5, 10],
    [7, 19],
    [3, 37],
    [1, 46],
    [32, 16],
    [28, 25],
    [30, 43],
    [34, 52],
    [23, 12],
    [21, 41],
    [50, 39],
    [48, 14],
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaceletError {
    #[error("Expected 54 facelets but got {0}")]
    WrongLength(usize),
    #[error("The facelet `{0}` does not match any center")]
    UnknownSymbol(char),
    #[error("More than one center has the color `{0}`")]
    DuplicateCenter(char),
    #[error("Expected 9 facelets of color `{symbol}` but got {count}")]
    WrongSymbolCount { symbol: char, count: usize },
}

impl CubieCube {
    /// Reads a cube from its facelets. The result still has to pass
    /// [`CubieCube::verify`] before it can be solved.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a sensible coloring of the 54
    /// stickers.
    pub fn from_facelets(facelets: &str) -> Result<Self, FaceletError> {
        let stickers = facelets.chars().collect::<Vec<_>>();
        let centers = CENTERS
            .iter()
            .map(|&i| stickers.get(i).copied())
            .collect::<Option<Vec<_>>>()
            .ok_or(FaceletError::WrongLength(stickers.len()))?;
        for (i, &center) in centers.iter().enumerate() {
            if centers[..i].contains(&center) {
                return Err(FaceletError::DuplicateCenter(center));
            }
        }

        let mut faces = Vec::with_capacity(stickers.len());
        let mut counts = [0; 6];
        for &sticker in &stickers {
            let face = centers
                .iter()
                .position(|&center| center == sticker)
                .ok_or(FaceletError::UnknownSymbol(sticker))?;
            counts[face] += 1;
            faces.push(face);
        }
        if let Some((face, &count)) = counts.iter().enumerate().find(|&(_, &count)| count != 9) {
            return Err(FaceletError::WrongSymbolCount {
                symbol: centers[face],
                count,
            });
        }
        Ok(Self::from_faces(&faces))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_faces(faces: &[usize]) -> Self {
        let u = Face::U as usize;
        let d = Face::D as usize;
        let mut cube = Self {
            corners: [0; 8],
            edges: [0; 12],
        };

        for (slot, stickers) in cube.corners.iter_mut().zip(&CORNER_FACELETS) {
            let Some(ori) = stickers
                .iter()
                .position(|&i| faces[i] == u || faces[i] == d)
            else {
                // Without a U or D sticker the orientation is undefined
                *slot = 3 << 3;
                continue;
            };
            let col1 = faces[stickers[(ori + 1) % 3]];
            let col2 = faces[stickers[(ori + 2) % 3]];
            if let Some(piece) = CORNER_FACELETS
                .iter()
                .position(|home| col1 == home[1] / 9 && col2 == home[2] / 9)
            {
                *slot = piece as u8 | (ori as u8) << 3;
            }
        }

        for (slot, stickers) in cube.edges.iter_mut().zip(&EDGE_FACELETS) {
            let (a, b) = (faces[stickers[0]], faces[stickers[1]]);
            for (piece, home) in EDGE_FACELETS.iter().enumerate() {
                if a == home[0] / 9 && b == home[1] / 9 {
                    *slot = (piece as u8) << 1;
                    break;
                }
                if a == home[1] / 9 && b == home[0] / 9 {
                    *slot = (piece as u8) << 1 | 1;
                    break;
                }
            }
        }
        cube
    }

    #[must_use]
    pub fn to_facelets(&self) -> String {
        let mut faces = [0; 54];
        for (i, face) in faces.iter_mut().enumerate() {
            *face = i / 9;
        }
        for (&corner, stickers) in self.corners.iter().zip(&CORNER_FACELETS) {
            let home = CORNER_FACELETS[usize::from(corner & 7)];
            let ori = usize::from(corner >> 3);
            for n in 0..3 {
                faces[stickers[(n + ori) % 3]] = home[n] / 9;
            }
        }
        for (&edge, stickers) in self.edges.iter().zip(&EDGE_FACELETS) {
            let home = EDGE_FACELETS[usize::from(edge >> 1)];
            let ori = usize::from(edge & 1);
            for n in 0..2 {
                faces[stickers[(n + ori) % 2]] = home[n] / 9;
            }
        }
        faces.iter().map(|&face| Face::ALL[face].as_char()).collect()
    }
}

/// The facelets of the cube reached by applying `scramble` to a solved cube.
#[must_use]
pub fn from_scramble(scramble: &MoveSequence) -> String {
    CubieCube::SOLVED.apply_moves(scramble).to_facelets()
}
