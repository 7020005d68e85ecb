//! Persisting [`Tables`] so later runs skip generation.
//!
//! A cache file is an 8-byte magic followed by every table in a fixed order,
//! each entry big-endian, and ends with the SHA-256 digest of those tables.
//! Table sizes are implied by the format so the file carries no lengths.

use crate::{
    coord::{CoordTable, N_FLIP_SYM, N_PERM_SYM, N_TWIST_SYM, SymClasses},
    cubie::{N_COMB, N_FLIP, N_MPERM, N_PERM, N_SLICE, N_TWIST},
    moves::{N_MOVES, N_MOVES2},
    pruning::PruningTable,
    tables::Tables,
};
use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};
use thiserror::Error;

const MAGIC: &[u8; 8] = b"TWOPHS02";
const DIGEST_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not access the table cache: {0}")]
    Io(#[from] io::Error),
    #[error("The file is not a table cache or was written by another version")]
    BadMagic,
    #[error("The table cache is corrupted")]
    Corrupted,
}

/// Writes every table to `out`.
///
/// # Errors
///
/// Forwards any error from the writer.
pub fn save(tables: &Tables, mut out: impl Write) -> Result<(), CacheError> {
    let mut payload = Vec::new();
    write_tables(tables, &mut payload)?;
    out.write_all(MAGIC)?;
    out.write_all(&payload)?;
    out.write_all(&Sha256::digest(&payload))?;
    out.flush()?;
    Ok(())
}

fn write_tables(tables: &Tables, out: &mut impl Write) -> io::Result<()> {
    for classes in [&tables.flip, &tables.twist, &tables.perm] {
        write_u16s(out, &classes.sym_to_raw)?;
    }
    for classes in [&tables.flip, &tables.twist, &tables.perm] {
        write_u16s(out, &classes.raw_to_sym)?;
    }
    write_u16s(out, &tables.perm_to_comb_parity)?;
    write_u16s(out, &tables.perm_inv_edge_sym)?;

    for table in [
        &tables.ud_slice_move,
        &tables.ud_slice_conj,
        &tables.twist_move,
        &tables.flip_move,
    ] {
        write_u16s(out, table.data())?;
    }
    write_u32s(out, tables.slice_twist_prun.words())?;
    write_u32s(out, tables.slice_flip_prun.words())?;

    for table in [
        &tables.corner_perm_move,
        &tables.edge_perm_move,
        &tables.mid_perm_move,
        &tables.mid_perm_conj,
        &tables.comb_parity_move,
        &tables.comb_parity_conj,
    ] {
        write_u16s(out, table.data())?;
    }
    write_u32s(out, tables.mid_corner_prun.words())?;
    write_u32s(out, tables.edge_comb_prun.words())
}

/// Reads tables written by [`save`].
///
/// # Errors
///
/// Fails if the reader fails, if the input does not start with the cache
/// magic, or if the tables do not match their digest.
pub fn load(mut input: impl Read) -> Result<Tables, CacheError> {
    let mut magic = [0; 8];
    input.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(CacheError::BadMagic);
    }

    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let Some(split) = bytes.len().checked_sub(DIGEST_LEN) else {
        return Err(CacheError::Corrupted);
    };
    let (payload, digest) = bytes.split_at(split);
    if Sha256::digest(payload).as_slice() != digest {
        return Err(CacheError::Corrupted);
    }

    let mut input = payload;
    let flip_sym_to_raw = read_u16s(&mut input, N_FLIP_SYM)?;
    let twist_sym_to_raw = read_u16s(&mut input, N_TWIST_SYM)?;
    let perm_sym_to_raw = read_u16s(&mut input, N_PERM_SYM)?;
    let flip = SymClasses {
        sym_to_raw: flip_sym_to_raw,
        raw_to_sym: read_u16s(&mut input, N_FLIP)?,
    };
    let twist = SymClasses {
        sym_to_raw: twist_sym_to_raw,
        raw_to_sym: read_u16s(&mut input, N_TWIST)?,
    };
    let perm = SymClasses {
        sym_to_raw: perm_sym_to_raw,
        raw_to_sym: read_u16s(&mut input, N_PERM)?,
    };
    let perm_to_comb_parity = read_u16s(&mut input, N_PERM_SYM)?;
    let perm_inv_edge_sym = read_u16s(&mut input, N_PERM_SYM)?;

    let ud_slice_move = read_table(&mut input, N_SLICE, N_MOVES)?;
    let ud_slice_conj = read_table(&mut input, N_SLICE, 8)?;
    let twist_move = read_table(&mut input, N_TWIST_SYM, N_MOVES)?;
    let flip_move = read_table(&mut input, N_FLIP_SYM, N_MOVES)?;
    let slice_twist_prun = read_pruning(&mut input, N_TWIST_SYM * N_SLICE)?;
    let slice_flip_prun = read_pruning(&mut input, N_FLIP_SYM * N_SLICE)?;

    let corner_perm_move = read_table(&mut input, N_PERM_SYM, N_MOVES2)?;
    let edge_perm_move = read_table(&mut input, N_PERM_SYM, N_MOVES2)?;
    let mid_perm_move = read_table(&mut input, N_MPERM, N_MOVES2)?;
    let mid_perm_conj = read_table(&mut input, N_MPERM, 16)?;
    let comb_parity_move = read_table(&mut input, N_COMB, N_MOVES2)?;
    let comb_parity_conj = read_table(&mut input, N_COMB, 16)?;
    let mid_corner_prun = read_pruning(&mut input, N_PERM_SYM * N_MPERM)?;
    let edge_comb_prun = read_pruning(&mut input, N_PERM_SYM * N_COMB)?;
    if !input.is_empty() {
        return Err(CacheError::Corrupted);
    }

    Ok(Tables {
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
    })
}

fn write_u16s(out: &mut impl Write, values: &[u16]) -> io::Result<()> {
    let bytes = values
        .iter()
        .flat_map(|value| value.to_be_bytes())
        .collect::<Vec<_>>();
    out.write_all(&bytes)
}

fn write_u32s(out: &mut impl Write, values: &[u32]) -> io::Result<()> {
    let bytes = values
        .iter()
        .flat_map(|value| value.to_be_bytes())
        .collect::<Vec<_>>();
    out.write_all(&bytes)
}

fn read_u16s(input: &mut impl Read, len: usize) -> io::Result<Box<[u16]>> {
    let mut bytes = vec![0; len * 2];
    input.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

fn read_table(input: &mut impl Read, rows: usize, cols: usize) -> io::Result<CoordTable> {
    Ok(CoordTable::from_raw(cols, read_u16s(input, rows * cols)?))
}

fn read_pruning(input: &mut impl Read, size: usize) -> io::Result<PruningTable> {
    let mut bytes = vec![0; size.div_ceil(8) * 4];
    input.read_exact(&mut bytes)?;
    Ok(PruningTable::from_words(
        bytes
            .chunks_exact(4)
            .map(|word| u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn foreign_files_are_rejected() {
        assert!(matches!(
            load(Cursor::new(b"not a table cache at all".to_vec())),
            Err(CacheError::BadMagic)
        ));
    }

    #[test]
    fn truncated_files_are_rejected() {
        assert!(matches!(
            load(Cursor::new(b"TWOP".to_vec())),
            Err(CacheError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof
        ));

        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0; 20]);
        assert!(matches!(load(Cursor::new(bytes)), Err(CacheError::Corrupted)));
    }

    #[test]
    fn short_payloads_with_a_valid_digest_are_rejected() {
        let payload = [0_u8; 100];
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&Sha256::digest(payload));
        assert!(matches!(
            load(Cursor::new(bytes)),
            Err(CacheError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }
}
