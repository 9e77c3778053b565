//! Non-systematic Reed-Solomon codec over GF(p^q).
//!
//! Encoding multiplies the zero-padded information vector by the
//! Vandermonde matrix `F[j][i] = alpha^(i*j)`; decoding multiplies by its
//! inverse (column step `-i`). Correction is table-driven: every 1-error
//! syndrome is precomputed, and 2-error syndromes are keyed only for the
//! canonical pattern with the first error at position 0 — a received
//! syndrome is cyclically shifted until it hits the canonical table, and
//! the shift count recovers the true first position.
//!
//! Codeword scalars on the wire are `u8` in `[0, n]`: `0` is the zero
//! element and `j` in `[1, n]` is the element with index `j - 1`. The +1
//! offset keeps `0` free for the additive identity so that XOR channel
//! errors land directly on storage values.

use std::collections::HashMap;

use log::trace;

use crate::gf::{Field, ZERO_IDX};
use crate::Error;

/// Reed-Solomon encoder/decoder with LUT-driven correction.
///
/// # Example
///
/// ```
/// use cascade_fec::{Field, RsCodec};
///
/// let field = Field::build(2, &[1, 0, 0, 1]).unwrap();
/// let rs = RsCodec::new(field, 5).unwrap();
/// let mut word = rs.encode(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
/// word[6] ^= 0b1001;
/// rs.correct(&mut word).unwrap();
/// assert_eq!(rs.decode(&word), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
/// ```
pub struct RsCodec {
    field: Field,
    n: usize,
    k: usize,
    r: usize,
    /// Bits per syndrome scalar in a packed table key.
    key_bits: u32,
    /// Syndrome -> (error position, error index). Covers every 1-error pattern.
    lut1: HashMap<u64, (usize, i32)>,
    /// Syndrome -> (position offset, first error index, second error index).
    /// Canonical patterns only: first error at position 0.
    lut2: HashMap<u64, (usize, i32, i32)>,
}

impl RsCodec {
    /// Build a codec with `parity` check symbols over `field`.
    ///
    /// The 1-error table needs distance 3 (`parity >= 2`), the 2-error
    /// table distance 5 (`parity >= 4`); smaller codes still encode,
    /// detect and decode but correct less.
    pub fn new(field: Field, parity: usize) -> Result<Self, Error> {
        let n = field.n();
        if parity == 0 || parity >= n {
            return Err(Error::BadParameters {
                reason: format!("RS parity count {parity} must be in 1..{n}"),
            });
        }
        let k = n - parity;
        assert!(k > 0);

        let key_bits = usize::BITS - (field.order() - 1).leading_zeros();
        if parity as u32 * key_bits > 64 {
            return Err(Error::BadParameters {
                reason: "syndrome does not fit a packed 64-bit table key".into(),
            });
        }

        let mut codec = Self {
            field,
            n,
            k,
            r: parity,
            key_bits,
            lut1: HashMap::new(),
            lut2: HashMap::new(),
        };
        if parity >= 2 {
            codec.build_lut1();
        }
        if parity >= 4 {
            codec.build_lut2();
        }
        Ok(codec)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn parity(&self) -> usize {
        self.r
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Encode `k` information scalars into an `n`-scalar codeword.
    pub fn encode(&self, a: &[u8]) -> Vec<u8> {
        assert_eq!(a.len(), self.k);
        let mut padded = vec![ZERO_IDX; self.n];
        for (dst, &src) in padded.iter_mut().zip(a) {
            debug_assert!((src as usize) <= self.n, "scalar {src} out of range");
            *dst = src as i32 - 1;
        }
        // s = a'F; column i of F steps the alpha exponent by i per row.
        let mut out = Vec::with_capacity(self.n);
        for i in 0..self.n {
            let mut acc = ZERO_IDX;
            let mut idx = 0;
            for &aj in &padded {
                acc = self.field.add(self.field.mult(aj, idx as i32), acc);
                idx = (idx + i) % self.n;
            }
            out.push((acc + 1) as u8);
        }
        out
    }

    /// Syndrome of a received word: row `i` of H steps the exponent by `i + 1`.
    ///
    /// All-zero output means a valid (or undetectably corrupted) codeword.
    pub fn syndrome(&self, v: &[u8]) -> Vec<u8> {
        assert_eq!(v.len(), self.n);
        let mut out = Vec::with_capacity(self.r);
        for i in 0..self.r {
            let mut acc = ZERO_IDX;
            let mut idx = 0;
            for &vj in v {
                acc = self.field.add(self.field.mult(vj as i32 - 1, idx as i32), acc);
                idx = (idx + i + 1) % self.n;
            }
            out.push((acc + 1) as u8);
        }
        out
    }

    /// The R x N matrix of alpha exponents behind [`syndrome`](Self::syndrome):
    /// entry (i, j) is `(i + 1) * j mod n`.
    pub fn parity_check_indices(&self) -> Vec<Vec<i32>> {
        (0..self.r)
            .map(|i| {
                let mut idx = 0;
                (0..self.n)
                    .map(|_| {
                        let cur = idx as i32;
                        idx = (idx + i + 1) % self.n;
                        cur
                    })
                    .collect()
            })
            .collect()
    }

    /// Shift a syndrome one codeword position to the left: row `i` loses
    /// `i + 1` from its alpha exponent. Zero scalars stay zero.
    pub fn shift_left(&self, c: &mut [u8]) {
        for (i, s) in c.iter_mut().enumerate() {
            if *s == 0 {
                continue;
            }
            let idx = (*s as usize - 1 + self.n - (i + 1) % self.n) % self.n;
            *s = (idx + 1) as u8;
        }
    }

    /// Inverse of [`shift_left`](Self::shift_left).
    pub fn shift_right(&self, c: &mut [u8]) {
        for (i, s) in c.iter_mut().enumerate() {
            if *s == 0 {
                continue;
            }
            let idx = (*s as usize - 1 + (i + 1)) % self.n;
            *s = (idx + 1) as u8;
        }
    }

    /// Correct up to two symbol errors in place.
    ///
    /// A zero syndrome passes through untouched. Otherwise the 1-error
    /// table is consulted, then the canonical 2-error table under cyclic
    /// syndrome shifts. An uncorrectable word is left unmodified.
    pub fn correct(&self, v: &mut [u8]) -> Result<(), Error> {
        assert_eq!(v.len(), self.n);
        let syndrome = self.syndrome(v);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(());
        }

        if let Some(&(pos, e)) = self.lut1.get(&self.syndrome_key(&syndrome)) {
            trace!("single error at position {pos}");
            self.subtract_error(v, pos, e);
            return Ok(());
        }

        // A double error at (first, first + delta) shifted left `first`
        // times becomes the canonical (0, delta) pattern with unchanged
        // error values. The first of two errors can sit anywhere up to
        // n - 2, so the search runs n - 1 rounds.
        let mut shifted = syndrome;
        for first in 0..self.n - 1 {
            if let Some(&(delta, e1, e2)) = self.lut2.get(&self.syndrome_key(&shifted)) {
                let second = first + delta;
                if second < self.n {
                    trace!("double error at positions {first}, {second}");
                    self.subtract_error(v, first, e1);
                    self.subtract_error(v, second, e2);
                    return Ok(());
                }
            }
            self.shift_left(&mut shifted);
        }

        Err(Error::UncorrectableRow)
    }

    /// Final decode step: inverse transform of a corrected word.
    ///
    /// The input must carry a zero syndrome; the last `parity` transform
    /// outputs are then zero and are stripped.
    pub fn decode(&self, v: &[u8]) -> Vec<u8> {
        assert_eq!(v.len(), self.n);
        let mut out = Vec::with_capacity(self.k);
        for i in 0..self.n {
            let step = (self.n - i) % self.n;
            let mut acc = ZERO_IDX;
            let mut idx = 0;
            for &vj in v {
                acc = self.field.add(self.field.mult(vj as i32 - 1, idx as i32), acc);
                idx = (idx + step) % self.n;
            }
            if i < self.k {
                out.push((acc + 1) as u8);
            } else {
                debug_assert_eq!(acc, ZERO_IDX, "tail coefficient {i} nonzero");
            }
        }
        out
    }

    fn subtract_error(&self, v: &mut [u8], pos: usize, e: i32) {
        let cur = v[pos] as i32 - 1;
        v[pos] = (self.field.sub(cur, e) + 1) as u8;
    }

    fn syndrome_key(&self, c: &[u8]) -> u64 {
        c.iter()
            .fold(0u64, |key, &s| (key << self.key_bits) | s as u64)
    }

    /// Every single error: position `pos`, error element `alpha^e`.
    /// Its syndrome row `i` is `alpha^((i+1)*pos + e)`.
    fn build_lut1(&mut self) {
        let n = self.n;
        self.lut1.reserve(n * n);
        let mut syndrome = vec![0u8; self.r];
        for pos in 0..n {
            for e in 0..n {
                for (i, s) in syndrome.iter_mut().enumerate() {
                    let idx = ((i + 1) * pos + e) % n;
                    *s = (idx + 1) as u8;
                }
                self.lut1
                    .insert(self.syndrome_key(&syndrome), (pos, e as i32));
            }
        }
    }

    /// Canonical double errors: `alpha^e1` at position 0, `alpha^e2` at
    /// position `delta`. Row `i` is `alpha^e1 + alpha^((i+1)*delta + e2)`.
    fn build_lut2(&mut self) {
        let n = self.n;
        self.lut2.reserve((n - 1) * n * n);
        let mut syndrome = vec![0u8; self.r];
        for delta in 1..n {
            for e1 in 0..n as i32 {
                for e2 in 0..n {
                    for (i, s) in syndrome.iter_mut().enumerate() {
                        let idx2 = ((i + 1) * delta + e2) % n;
                        let sum = self.field.add(e1, idx2 as i32);
                        *s = (sum + 1) as u8;
                    }
                    self.lut2
                        .insert(self.syndrome_key(&syndrome), (delta, e1, e2 as i32));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs15_10() -> RsCodec {
        let field = Field::build(2, &[1, 0, 0, 1]).unwrap();
        RsCodec::new(field, 5).unwrap()
    }

    fn lcg(state: &mut u32) -> u32 {
        *state = state.wrapping_mul(1103515245).wrapping_add(12345);
        *state >> 16
    }

    #[test]
    fn test_encode_ones_zero_syndrome() {
        let rs = rs15_10();
        let s = rs.encode(&[1; 10]);
        assert_eq!(s.len(), 15);
        assert_eq!(rs.syndrome(&s), vec![0; 5]);
        assert_eq!(rs.decode(&s), vec![1; 10]);
    }

    #[test]
    fn test_roundtrip_all_information_patterns() {
        let rs = rs15_10();
        let cases: [&[u8]; 4] = [
            &[0; 10],
            &[15; 10],
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            &[9, 14, 3, 0, 15, 1, 7, 11, 2, 8],
        ];
        for msg in cases {
            let encoded = rs.encode(msg);
            assert_eq!(rs.syndrome(&encoded), vec![0; 5], "nonzero syndrome for {msg:?}");
            assert_eq!(rs.decode(&encoded), msg, "roundtrip failed for {msg:?}");
        }
    }

    #[test]
    fn test_correct_every_single_error() {
        let rs = rs15_10();
        let msg = [3, 0, 7, 15, 1, 8, 2, 12, 5, 10];
        let encoded = rs.encode(&msg);
        for pos in 0..15 {
            for err in 1..=15u8 {
                let mut corrupted = encoded.clone();
                corrupted[pos] ^= err;
                rs.correct(&mut corrupted)
                    .unwrap_or_else(|_| panic!("1-error at {pos} value {err} not corrected"));
                assert_eq!(corrupted, encoded, "wrong correction at {pos} value {err}");
            }
        }
    }

    #[test]
    fn test_correct_specific_double_error() {
        let rs = rs15_10();
        let encoded = rs.encode(&[1; 10]);
        let mut corrupted = encoded.clone();
        corrupted[2] ^= 4;
        corrupted[9] ^= 1;
        rs.correct(&mut corrupted).unwrap();
        assert_eq!(corrupted, encoded);
        assert_eq!(rs.decode(&corrupted), vec![1; 10]);
    }

    #[test]
    fn test_correct_double_errors_all_position_pairs() {
        let rs = rs15_10();
        let msg = [0, 5, 11, 2, 15, 9, 4, 1, 13, 6];
        let encoded = rs.encode(&msg);
        let mut seed = 0xC0DEC;
        for p1 in 0..15 {
            for p2 in p1 + 1..15 {
                let e1 = (lcg(&mut seed) % 15 + 1) as u8;
                let e2 = (lcg(&mut seed) % 15 + 1) as u8;
                let mut corrupted = encoded.clone();
                corrupted[p1] ^= e1;
                corrupted[p2] ^= e2;
                rs.correct(&mut corrupted)
                    .unwrap_or_else(|_| panic!("2-error at ({p1},{p2}) values ({e1},{e2})"));
                assert_eq!(corrupted, encoded, "wrong correction at ({p1},{p2})");
            }
        }
    }

    #[test]
    fn test_correct_adjacent_and_extreme_pairs() {
        let rs = rs15_10();
        let encoded = rs.encode(&[7; 10]);
        for (p1, p2) in [(0, 1), (13, 14), (0, 14), (7, 8)] {
            for (e1, e2) in [(1, 1), (15, 15), (4, 9)] {
                let mut corrupted = encoded.clone();
                corrupted[p1] ^= e1;
                corrupted[p2] ^= e2;
                rs.correct(&mut corrupted).unwrap();
                assert_eq!(corrupted, encoded);
            }
        }
    }

    #[test]
    fn test_triple_error_uncorrectable() {
        let rs = rs15_10();
        let encoded = rs.encode(&[1; 10]);
        let mut corrupted = encoded.clone();
        corrupted[0] ^= 1;
        corrupted[5] ^= 2;
        corrupted[10] ^= 3;
        let backup = corrupted.clone();
        assert!(matches!(rs.correct(&mut corrupted), Err(Error::UncorrectableRow)));
        assert_eq!(corrupted, backup, "uncorrectable word was modified");
    }

    #[test]
    fn test_shift_left_right_inverse() {
        let rs = rs15_10();
        let encoded = rs.encode(&[2, 4, 6, 8, 10, 12, 14, 1, 3, 5]);
        let mut corrupted = encoded;
        corrupted[3] ^= 9;
        corrupted[11] ^= 2;
        let syndrome = rs.syndrome(&corrupted);
        let mut shifted = syndrome.clone();
        for _ in 0..4 {
            rs.shift_left(&mut shifted);
        }
        for _ in 0..4 {
            rs.shift_right(&mut shifted);
        }
        assert_eq!(shifted, syndrome);
    }

    #[test]
    fn test_shift_left_moves_error_position() {
        let rs = rs15_10();
        let encoded = rs.encode(&[0; 10]);
        // error at position 3: four left shifts would walk past canonical,
        // three land exactly on the position-0 pattern
        let mut corrupted = encoded;
        corrupted[3] ^= 6;
        let mut syndrome = rs.syndrome(&corrupted);
        for _ in 0..3 {
            rs.shift_left(&mut syndrome);
        }
        let key_pos = rs.lut1[&rs.syndrome_key(&syndrome)];
        assert_eq!(key_pos.0, 0, "shifted syndrome should match position 0");
    }

    #[test]
    fn test_parity_check_indices_shape() {
        let rs = rs15_10();
        let h = rs.parity_check_indices();
        assert_eq!(h.len(), 5);
        for (i, row) in h.iter().enumerate() {
            assert_eq!(row.len(), 15);
            assert_eq!(row[0], 0);
            assert_eq!(row[1], (i as i32 + 1) % 15);
        }
    }

    #[test]
    fn test_lut_sizes() {
        let rs = rs15_10();
        assert_eq!(rs.lut1.len(), 15 * 15);
        assert_eq!(rs.lut2.len(), 14 * 15 * 15);
    }

    #[test]
    fn test_rs15_11_profile() {
        // the shorter-parity variant still corrects two errors (d = 5)
        let field = Field::build(2, &[1, 0, 0, 1]).unwrap();
        let rs = RsCodec::new(field, 4).unwrap();
        assert_eq!(rs.k(), 11);
        let msg: Vec<u8> = (0..11).collect();
        let encoded = rs.encode(&msg);
        let mut corrupted = encoded.clone();
        corrupted[1] ^= 3;
        corrupted[12] ^= 14;
        rs.correct(&mut corrupted).unwrap();
        assert_eq!(rs.decode(&corrupted), msg);
    }

    #[test]
    fn test_invalid_parity_rejected() {
        let field = Field::build(2, &[1, 0, 0, 1]).unwrap();
        assert!(matches!(
            RsCodec::new(field, 15),
            Err(Error::BadParameters { .. })
        ));
    }
}
