//! Nibble-packed pruning tables over a symmetry-reduced coordinate paired with
//! a raw coordinate.

use crate::{coord::CoordTable, working};
use log::debug;
use std::time::Instant;

const UNVISITED: u8 = 0xf;
const SYM_E2C_MAGIC: usize = 0x00DD_DD00;

/// Exact distances to solved of every `(class, raw)` pair, eight 4-bit
/// entries to a word. The entry of a pair lives at `class * n_raw + raw`,
/// where `raw` has been conjugated into the frame of the class
/// representative.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PruningTable(Box<[u32]>);

impl PruningTable {
    fn unvisited(size: usize) -> Self {
        Self(vec![u32::MAX; size.div_ceil(8)].into_boxed_slice())
    }

    pub(crate) fn from_words(words: Box<[u32]>) -> Self {
        Self(words)
    }

    pub(crate) fn words(&self) -> &[u32] {
        &self.0
    }

    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn get(&self, index: usize) -> u8 {
        (self.0[index >> 3] >> ((index & 7) << 2) & 0xf) as u8
    }

    #[inline(always)]
    fn set(&mut self, index: usize, value: u8) {
        let shift = (index & 7) << 2;
        let word = &mut self.0[index >> 3];
        *word = *word & !(0xf << shift) | u32::from(value) << shift;
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PruningParams {
    /// Bits of the packed symmetry coordinate holding the symmetry.
    pub sym_shift: u32,
    /// The symmetry coordinate is a corner permutation whose self
    /// symmetries were computed on edges.
    pub e2c: bool,
    pub name: &'static str,
}

/// Fills a pruning table by a breadth-first search from the solved state.
///
/// The search is layered: every entry at `depth` is expanded by every move
/// before any entry at `depth + 1` is. When a new pair is stamped, so is every
/// pair it is equivalent to under the self symmetries of its class, since
/// those pairs are the same cube seen from another frame.
///
/// # Panics
///
/// Panics if a layer adds nothing before the table is full or if a distance
/// does not fit in a nibble.
pub(crate) fn build_pruning_table(
    raw_move: &CoordTable,
    raw_conj: &CoordTable,
    sym_move: &CoordTable,
    sym_state: &[u16],
    params: PruningParams,
) -> PruningTable {
    let start = Instant::now();
    let n_raw = raw_conj.rows();
    let size = sym_move.rows() * n_raw;
    let n_moves = sym_move.cols();
    let sym_mask = (1 << params.sym_shift) - 1;

    let mut table = PruningTable::unvisited(size);
    table.set(0, 0);
    let mut done = 1;
    let mut depth = 0;

    while done < size {
        assert!(
            depth + 1 < UNVISITED,
            "The {} pruning table is deeper than a nibble allows",
            params.name
        );
        let mut stamped = 0;
        for index in 0..size {
            if table.get(index) != depth {
                continue;
            }
            let sym = index / n_raw;
            let raw = index % n_raw;
            for m in 0..n_moves {
                let packed = sym_move.get(sym, m);
                let rawx = raw_conj.get(raw_move.get(raw, m), packed & sym_mask);
                let symx = packed >> params.sym_shift;
                let next = symx * n_raw + rawx;
                if table.get(next) != UNVISITED {
                    continue;
                }
                table.set(next, depth + 1);
                stamped += 1;

                let self_sym = sym_state[symx];
                for j in 1..16 {
                    if self_sym >> j & 1 == 0 {
                        continue;
                    }
                    let conj = if params.e2c {
                        j ^ (SYM_E2C_MAGIC >> (j << 1) & 3)
                    } else {
                        j
                    };
                    let twin = symx * n_raw + raw_conj.get(rawx, conj);
                    if table.get(twin) == UNVISITED {
                        table.set(twin, depth + 1);
                        stamped += 1;
                    }
                }
            }
        }

        assert!(
            stamped > 0,
            "The {} pruning table stalled at depth {depth} with {done} of {size} entries",
            params.name
        );
        done += stamped;
        depth += 1;
        debug!(
            working!("{} pruning depth {}: {} of {} entries"),
            params.name, depth, done, size
        );
    }

    debug!(
        working!("{} pruning table finished in {:.3}s"),
        params.name,
        start.elapsed().as_secs_f64()
    );
    table
}
