//! Ranking and unranking of permutations and combinations over small piece
//! sets. Piece values are packed into nibbles of a `u64` so that at most 16
//! pieces are supported, which is plenty for corners and edges.

use itertools::Itertools;

/// Pascal's triangle; `BINOMIAL[n][k]` is zero whenever `k > n`.
pub const BINOMIAL: [[u32; 13]; 13] = {
    let mut table = [[0; 13]; 13];
    let mut n = 0;
    while n < 13 {
        table[n][0] = 1;
        table[n][n] = 1;
        let mut k = 1;
        while k < n {
            table[n][k] = table[n - 1][k - 1] + table[n - 1][k];
            k += 1;
        }
        n += 1;
    }
    table
};

const IDENTITY_NIBBLES: u64 = 0xFEDC_BA98_7654_3210;

/// Lehmer rank of a permutation of `0..perm.len()`.
///
/// The still-unused values live in the nibbles of `remaining`; looking up the
/// nibble of a value gives the count of unused values smaller than it.
#[allow(clippy::cast_possible_truncation)]
pub fn permutation_rank(perm: &[u8]) -> u32 {
    let n = perm.len();
    let mut rank = 0;
    let mut remaining = IDENTITY_NIBBLES;
    for (i, &value) in perm[..n - 1].iter().enumerate() {
        let shift = u32::from(value) << 2;
        let digit = ((remaining >> shift) & 0xf) as u32;
        rank = (n - i) as u32 * rank + digit;
        remaining -= 0x1111_1111_1111_1110 << shift;
    }
    rank
}

/// Inverse of [`permutation_rank`]. Fills `out` with the permutation of
/// `0..out.len()` having the given rank.
#[allow(clippy::cast_possible_truncation)]
pub fn permutation_unrank(mut rank: u32, out: &mut [u8]) {
    let n = out.len();
    let mut digits = 0_u64;
    for radix in 2..=n as u32 {
        digits = digits << 4 | u64::from(rank % radix);
        rank /= radix;
    }

    let mut remaining = IDENTITY_NIBBLES;
    for slot in &mut out[..n - 1] {
        let shift = (digits & 0xf) << 2;
        digits >>= 4;
        *slot = ((remaining >> shift) & 0xf) as u8;
        let low = (1 << shift) - 1;
        remaining = (remaining & low) | ((remaining >> 4) & !low);
    }
    out[n - 1] = (remaining & 0xf) as u8;
}

/// Parity of the permutation of `n` elements with the given rank, read
/// directly off its factorial-base digits.
#[allow(clippy::cast_possible_truncation)]
pub fn permutation_parity(mut rank: u32, n: u32) -> u8 {
    let mut parity = 0;
    for i in (0..n - 1).rev() {
        parity ^= rank % (n - i);
        rank /= n - i;
    }
    (parity & 1) as u8
}

/// Parity of an arbitrary permutation, counted by inversions.
#[allow(clippy::cast_possible_truncation)]
pub fn parity_of(perm: &[u8]) -> u8 {
    let inversions = perm
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a > b)
        .count();
    (inversions & 1) as u8
}

/// Rank of the positions holding the four pieces whose value satisfies
/// `value & 0xc == mask`. Positions are scanned from the end.
#[allow(clippy::cast_possible_truncation)]
pub fn combination_rank(values: &[u8], mask: u8) -> u16 {
    let mut rank = 0;
    let mut r = 4;
    for (i, &value) in values.iter().enumerate().rev() {
        if value & 0xc == mask {
            rank += BINOMIAL[i][r];
            r -= 1;
        }
    }
    rank as u16
}

/// Inverse of [`combination_rank`]. The chosen positions receive the masked
/// pieces in increasing order and the rest are filled with the remaining
/// pieces, also in increasing order.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn combination_unrank(rank: u16, mask: u8, out: &mut [u8]) {
    let mut rank = u32::from(rank);
    let mut r = 4;
    let mut fill = out.len() as i32 - 1;
    for (i, slot) in out.iter_mut().enumerate().rev() {
        if r > 0 && rank >= BINOMIAL[i][r] {
            rank -= BINOMIAL[i][r];
            r -= 1;
            *slot = r as u8 | mask;
        } else {
            if fill & 0xc == i32::from(mask) {
                fill -= 4;
            }
            *slot = fill as u8;
            fill -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_rows() {
        assert_eq!(BINOMIAL[12][4], 495);
        assert_eq!(BINOMIAL[8][4], 70);
        assert_eq!(BINOMIAL[3][4], 0);
    }

    #[test]
    fn permutation_ranks_round_trip() {
        let mut perm = [0; 8];
        for rank in (0..40320).step_by(7) {
            permutation_unrank(rank, &mut perm);
            assert_eq!(permutation_rank(&perm), rank);
            assert_eq!(permutation_parity(rank, 8), parity_of(&perm));
        }

        let mut perm = [0; 12];
        for rank in [0, 1, 23, 24, 119_750_400, 479_001_599] {
            permutation_unrank(rank, &mut perm);
            assert_eq!(permutation_rank(&perm), rank);
            assert_eq!(permutation_parity(rank, 12), parity_of(&perm));
        }
    }

    #[test]
    fn identity_has_rank_zero() {
        let perm: Vec<u8> = (0..12).collect();
        assert_eq!(permutation_rank(&perm), 0);
        assert_eq!(parity_of(&perm), 0);
    }

    #[test]
    fn combination_ranks_round_trip() {
        let mut edges = [0; 12];
        for rank in 0..495 {
            combination_unrank(rank, 8, &mut edges);
            assert_eq!(combination_rank(&edges, 8), rank);
            let mut sorted = edges;
            sorted.sort_unstable();
            assert_eq!(sorted, core::array::from_fn(|i| i as u8));
        }

        let mut corners = [0; 8];
        for rank in 0..70 {
            combination_unrank(rank, 0, &mut corners);
            assert_eq!(combination_rank(&corners, 0), rank);
        }
    }

    #[test]
    fn solved_slice_is_the_top_rank() {
        let edges: Vec<u8> = (0..12).collect();
        assert_eq!(combination_rank(&edges, 8), 494);
        let corners: Vec<u8> = (0..8).collect();
        assert_eq!(combination_rank(&corners, 0), 0);
    }
}
