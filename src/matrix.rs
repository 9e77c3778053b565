//! Binary parity-check matrix manipulation.
//!
//! Conversion to systematic form works by row XOR plus column swaps; the
//! swaps are recorded as a transcript so codewords can be permuted between
//! the original and the systematic column layouts.

use crate::Error;

/// Dense 0/1 matrix as rows of bytes.
pub type BitMatrix = Vec<Vec<u8>>;

/// Column swap transcript, in application order.
pub type SwapList = Vec<(usize, usize)>;

/// Number of nonzero entries in a row.
pub fn row_weight(row: &[u8]) -> usize {
    row.iter().filter(|&&b| b != 0).count()
}

/// Permute a vector into the systematic column layout.
pub fn apply_swaps<T>(v: &mut [T], swaps: &[(usize, usize)]) {
    for &(a, b) in swaps {
        v.swap(a, b);
    }
}

/// Permute a vector back to the original column layout.
pub fn undo_swaps<T>(v: &mut [T], swaps: &[(usize, usize)]) {
    for &(a, b) in swaps.iter().rev() {
        v.swap(a, b);
    }
}

/// Bring `h` to systematic form: an R x R identity on the target columns
/// (the rightmost R by default, or an explicit `columns` set).
///
/// Returns the transformed matrix together with the column-swap
/// transcript that was needed; a matrix that cannot form the identity on
/// the requested columns is rank-deficient there.
pub fn systematize(
    h: &BitMatrix,
    columns: Option<&[usize]>,
) -> Result<(BitMatrix, SwapList), Error> {
    let rows = h.len();
    let cols = h.first().map_or(0, Vec::len);
    if rows == 0 || cols < rows || h.iter().any(|row| row.len() != cols) {
        return Err(Error::ParityMatrixShape { rows, cols });
    }
    if let Some(c) = columns {
        assert_eq!(c.len(), rows, "one target column per row");
    }

    let mut m = h.clone();
    let mut swaps = SwapList::new();

    // Upper pass, bottom row first: plant a leading 1 in each target
    // column, then clear that column above.
    for i in (0..rows).rev() {
        let col = target_col(i, rows, cols, columns);
        if !form_lead_by_sum(&mut m, i, col) {
            match form_lead_by_swap(&mut m, i, col, columns) {
                Some(swap) => swaps.push(swap),
                None => return Err(Error::ParityMatrixRankDeficient),
            }
        }
        for j in 0..i {
            if m[j][col] != 0 {
                xor_row_into(&mut m, i, j);
            }
        }
    }

    // Lower pass: clear each target column below its row.
    for i in 0..rows {
        let col = target_col(i, rows, cols, columns);
        for j in i + 1..rows {
            if m[j][col] != 0 {
                xor_row_into(&mut m, i, j);
            }
        }
    }

    Ok((m, swaps))
}

fn target_col(i: usize, rows: usize, cols: usize, columns: Option<&[usize]>) -> usize {
    match columns {
        Some(c) => c[i],
        None => cols - rows + i,
    }
}

/// m[dst] ^= m[src]
fn xor_row_into(m: &mut BitMatrix, src: usize, dst: usize) {
    debug_assert_ne!(src, dst);
    let row = m[src].clone();
    for (d, &s) in m[dst].iter_mut().zip(&row) {
        *d ^= s;
    }
}

/// Plant a 1 at `m[i][col]` by XOR-ing in a row above that has one.
fn form_lead_by_sum(m: &mut BitMatrix, i: usize, col: usize) -> bool {
    if m[i][col] != 0 {
        return true;
    }
    let Some(src) = (0..i).rev().find(|&j| m[j][col] != 0) else {
        return false;
    };
    xor_row_into(m, src, i);
    true
}

/// Plant a 1 at `m[i][col]` by swapping in a non-reserved column that has
/// one in row `i`. Reserved columns are the identity targets.
fn form_lead_by_swap(
    m: &mut BitMatrix,
    i: usize,
    col: usize,
    columns: Option<&[usize]>,
) -> Option<(usize, usize)> {
    let rows = m.len();
    let cols = m[0].len();
    let reserved = |j: usize| match columns {
        Some(c) => c.contains(&j),
        None => j >= cols - rows,
    };
    let donor = (0..cols).find(|&j| !reserved(j) && m[i][j] != 0)?;
    for row in m.iter_mut() {
        row.swap(col, donor);
    }
    Some((col, donor))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Extended Hamming parity check for R = 4: all-ones row plus the
    /// binary counting rows over N = 8 columns.
    fn hamming_h8() -> BitMatrix {
        vec![
            vec![1, 1, 1, 1, 1, 1, 1, 1],
            vec![0, 0, 0, 1, 1, 1, 1, 0],
            vec![0, 1, 1, 0, 0, 1, 1, 0],
            vec![1, 0, 1, 0, 1, 0, 1, 0],
        ]
    }

    fn assert_identity_at(m: &BitMatrix, targets: &[usize]) {
        for (i, &col) in targets.iter().enumerate() {
            for (row, r) in m.iter().enumerate() {
                let expect = u8::from(row == i);
                assert_eq!(r[col], expect, "entry ({row}, {col})");
            }
        }
    }

    #[test]
    fn test_systematize_default_columns() {
        let h = hamming_h8();
        let (sys, _) = systematize(&h, None).unwrap();
        assert_identity_at(&sys, &[4, 5, 6, 7]);
    }

    #[test]
    fn test_systematize_idempotent() {
        let h = hamming_h8();
        let (sys, _) = systematize(&h, None).unwrap();
        let (sys2, swaps2) = systematize(&sys, None).unwrap();
        assert_eq!(sys, sys2);
        assert!(swaps2.is_empty(), "second pass should not swap");
    }

    #[test]
    fn test_systematize_explicit_columns() {
        let h = hamming_h8();
        let targets = [0, 2, 5, 7];
        let (sys, _) = systematize(&h, Some(&targets)).unwrap();
        assert_identity_at(&sys, &targets);
    }

    #[test]
    fn test_rank_deficient_rejected() {
        // row 2 = row 0 ^ row 1: rank 2 < 3
        let h: BitMatrix = vec![
            vec![1, 0, 1, 1, 0],
            vec![0, 1, 1, 0, 1],
            vec![1, 1, 0, 1, 1],
        ];
        assert!(matches!(
            systematize(&h, None),
            Err(Error::ParityMatrixRankDeficient)
        ));
    }

    #[test]
    fn test_swap_transcript_recorded() {
        // column 3 is zero in every row, so the identity needs a swap
        let h: BitMatrix = vec![vec![1, 1, 0, 0], vec![0, 1, 1, 0]];
        let (sys, swaps) = systematize(&h, None).unwrap();
        assert_identity_at(&sys, &[2, 3]);
        assert!(!swaps.is_empty());
    }

    #[test]
    fn test_apply_undo_swaps_roundtrip() {
        let swaps = vec![(0, 3), (1, 2), (0, 1)];
        let original = [10, 20, 30, 40];
        let mut v = original;
        apply_swaps(&mut v, &swaps);
        assert_ne!(v, original);
        undo_swaps(&mut v, &swaps);
        assert_eq!(v, original);
    }

    #[test]
    fn test_swapped_codeword_satisfies_original_matrix() {
        // every codeword of the systematic form, un-swapped, must check
        // against the original matrix
        let h: BitMatrix = vec![vec![1, 1, 0, 0], vec![0, 1, 1, 0]];
        let (sys, swaps) = systematize(&h, None).unwrap();
        let k = 2;
        for info in 0..(1 << k) {
            let mut c = vec![0u8; 4];
            for (j, cj) in c.iter_mut().take(k).enumerate() {
                *cj = (info >> j) & 1;
            }
            for i in 0..sys.len() {
                let parity = (0..k).fold(0, |acc, j| acc ^ (sys[i][j] & c[j]));
                c[k + i] = parity;
            }
            undo_swaps(&mut c, &swaps);
            for row in &h {
                let check = row.iter().zip(&c).fold(0, |acc, (&hb, &cb)| acc ^ (hb & cb));
                assert_eq!(check, 0, "original parity violated for word {info:b}");
            }
        }
    }

    #[test]
    fn test_row_weight() {
        assert_eq!(row_weight(&[0, 0, 0]), 0);
        assert_eq!(row_weight(&[1, 0, 1, 1]), 3);
    }
}
