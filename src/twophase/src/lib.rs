#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

pub mod cache;
pub(crate) mod coord;
pub mod cubie;
pub mod facelet;
pub(crate) mod math;
pub mod moves;
pub(crate) mod pruning;
pub mod search;
pub mod symmetry;
pub mod tables;

pub use cubie::{CubieCube, InvalidCubeError};
pub use facelet::FaceletError;
pub use moves::{Move, MoveSequence};
pub use search::{Search, SearchOptions, Solution, SolutionFormat, SolveError};
pub use tables::Tables;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// Solves the cube described by `facelets`, generating the tables first if
/// no other call has.
///
/// # Errors
///
/// Fails on malformed facelets or an unsolvable cube before any table work,
/// and otherwise when the search finds nothing within `options`.
pub fn solve(facelets: &str, options: &SearchOptions) -> Result<Solution, SolveError> {
    let cube = CubieCube::from_facelets(facelets)?;
    cube.verify()?;
    Search::new(Tables::get(), options).solve_cube(&cube)
}
