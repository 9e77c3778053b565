//! Outer binary block code over vector symbols, operated in erasure mode.
//!
//! The code is defined by a binary parity-check matrix H. Construction
//! brings H to systematic form once, keeping the original, the systematic
//! form and the column-swap transcript side by side; the boundary flag
//! picks which layout codewords have on the wire.
//!
//! Erased symbols are recovered by solving H_sys restricted to the erased
//! columns against the XOR-sum of the surviving columns. The solver first
//! runs a greedy weight-minimising pass that tries to isolate one erased
//! position per row; the pass is scan-order sensitive, so a failed
//! coverage check retries with the opposite order before falling back to
//! full Gaussian elimination.

use log::{debug, trace};

use crate::matrix::{self, BitMatrix, SwapList};
use crate::symbol::{SymbolStatus, VectorSymbol};
use crate::Error;

/// Details of one erasure decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErasureReport {
    /// Number of erased positions seen.
    pub erased: usize,
    /// Whether recovery needed the reversed scan order (or the fallback).
    pub strategy_flipped: bool,
}

/// Scan order of the weight-minimising pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Forward,
    Backward,
}

impl Scan {
    fn opposite(self) -> Self {
        match self {
            Scan::Forward => Scan::Backward,
            Scan::Backward => Scan::Forward,
        }
    }

    fn order(self, r: usize) -> Vec<usize> {
        match self {
            Scan::Forward => (0..r).collect(),
            Scan::Backward => (0..r).rev().collect(),
        }
    }
}

/// Binary linear block code over vector symbols.
///
/// # Example
///
/// ```
/// use cascade_fec::{OuterCode, VectorSymbol};
///
/// let code = OuterCode::extended_hamming(4, 2).unwrap();
/// let info: Vec<VectorSymbol> = (1u8..=4)
///     .map(|i| VectorSymbol::normal(vec![i, 15 - i]))
///     .collect();
/// let mut word = code.encode(&info).unwrap();
/// word[2] = VectorSymbol::erased(2);
/// let (recovered, report) = code.decode(&word).unwrap();
/// assert_eq!(recovered, info);
/// assert_eq!(report.erased, 1);
/// ```
pub struct OuterCode {
    r: usize,
    n: usize,
    k: usize,
    d: usize,
    /// Inner scalars per symbol.
    m: usize,
    h: BitMatrix,
    h_sys: BitMatrix,
    swaps: SwapList,
    systematic: bool,
}

impl OuterCode {
    /// Extended Hamming code with `r` check symbols: N = 2^(r-1), D = 4.
    ///
    /// Row 0 is the overall parity; the remaining rows count the column
    /// index plus one in binary, one bit plane per row.
    pub fn extended_hamming(r: usize, m: usize) -> Result<Self, Error> {
        if r < 3 {
            return Err(Error::BadParameters {
                reason: format!("extended Hamming needs at least 3 check symbols, got {r}"),
            });
        }
        let n = 1usize << (r - 1);
        let mut h: BitMatrix = vec![vec![0; n]; r];
        h[0] = vec![1; n];
        let mut deg = n / 2;
        for row in h.iter_mut().skip(1) {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (((j + 1) / deg) % 2) as u8;
            }
            deg /= 2;
        }
        Self::from_parity_check(h, 4, m)
    }

    /// Code defined by an arbitrary parity-check matrix and its distance.
    pub fn from_parity_check(h: BitMatrix, distance: usize, m: usize) -> Result<Self, Error> {
        let r = h.len();
        let n = h.first().map_or(0, Vec::len);
        if r == 0 || n <= r || h.iter().any(|row| row.len() != n) {
            return Err(Error::ParityMatrixShape { rows: r, cols: n });
        }
        let (h_sys, swaps) = matrix::systematize(&h, None)?;
        debug!(
            "outer ({n},{k},{distance}) ready, {swaps} column swaps",
            k = n - r,
            swaps = swaps.len()
        );
        Ok(Self {
            r,
            n,
            k: n - r,
            d: distance,
            m,
            h,
            h_sys,
            swaps,
            systematic: true,
        })
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

    pub fn distance(&self) -> usize {
        self.d
    }

    pub fn symbol_len(&self) -> usize {
        self.m
    }

    pub fn is_systematic(&self) -> bool {
        self.systematic
    }

    /// Choose the wire layout: systematic H_sys (default) or the original H.
    pub fn set_systematic(&mut self, on: bool) {
        self.systematic = on;
    }

    /// Encode `k` Normal information symbols into an `n`-symbol codeword.
    pub fn encode(&self, a: &[VectorSymbol]) -> Result<Vec<VectorSymbol>, Error> {
        assert_eq!(a.len(), self.k);
        if a.iter().any(|s| !s.is_normal() || s.len() != self.m) {
            return Err(Error::BadParameters {
                reason: format!("encode expects Normal symbols of {} scalars", self.m),
            });
        }
        let mut v: Vec<VectorSymbol> = a.to_vec();
        for i in 0..self.r {
            let mut parity = VectorSymbol::zero(self.m);
            for (j, sym) in a.iter().enumerate() {
                if self.h_sys[i][j] != 0 {
                    parity += sym;
                }
            }
            v.push(parity);
        }
        if !self.systematic {
            matrix::undo_swaps(&mut v, &self.swaps);
        }
        Ok(v)
    }

    /// H * v over vector symbols, in the current boundary layout.
    /// All-zero for an intact codeword without erasures.
    pub fn syndrome(&self, v: &[VectorSymbol]) -> Vec<VectorSymbol> {
        assert_eq!(v.len(), self.n);
        let h = if self.systematic { &self.h_sys } else { &self.h };
        (0..self.r)
            .map(|i| {
                let mut acc = VectorSymbol::zero(self.m);
                for (j, sym) in v.iter().enumerate() {
                    if h[i][j] != 0 {
                        acc += sym;
                    }
                }
                acc
            })
            .collect()
    }

    /// Recover the erased positions of `v` and return the information
    /// symbols.
    ///
    /// More erasures than check symbols fail immediately; an erasure count
    /// below the code distance is guaranteed to recover, possibly through
    /// the flipped scan order or the Gaussian fallback.
    pub fn decode(&self, v: &[VectorSymbol]) -> Result<(Vec<VectorSymbol>, ErasureReport), Error> {
        assert_eq!(v.len(), self.n);
        let mut work: Vec<VectorSymbol> = v.to_vec();
        if !self.systematic {
            matrix::apply_swaps(&mut work, &self.swaps);
        }

        let ids: Vec<usize> = work
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status() == SymbolStatus::Erased)
            .map(|(i, _)| i)
            .collect();
        let mut report = ErasureReport {
            erased: ids.len(),
            strategy_flipped: false,
        };

        if ids.len() > self.r {
            return Err(Error::TooManyErasures {
                erased: ids.len(),
                max: self.r,
            });
        }
        if ids.is_empty() {
            work.truncate(self.k);
            return Ok((work, report));
        }

        let recovered = self
            .recover(&work, &ids, Scan::Forward)
            .or_else(|| {
                trace!("retrying erasure recovery in reversed scan order");
                report.strategy_flipped = true;
                self.recover(&work, &ids, Scan::Backward)
            })
            .or_else(|| {
                trace!("falling back to Gaussian elimination");
                self.recover_gauss(&work, &ids)
            })
            .ok_or(Error::UnrecoverableErasurePattern)?;

        for (&slot, sym) in ids.iter().zip(recovered) {
            work[slot] = sym;
        }
        work.truncate(self.k);
        Ok((work, report))
    }

    /// Free-term column and erasure submatrix of the linear system.
    ///
    /// Since H_sys * codeword = 0, the XOR-sum of the surviving columns
    /// equals the contribution of the erased ones.
    fn build_system(&self, v: &[VectorSymbol], ids: &[usize]) -> (BitMatrix, Vec<VectorSymbol>) {
        let mut f = vec![VectorSymbol::zero(self.m); self.r];
        for (j, sym) in v.iter().enumerate() {
            if sym.status() != SymbolStatus::Normal {
                continue;
            }
            for (row, acc) in f.iter_mut().enumerate() {
                if self.h_sys[row][j] != 0 {
                    *acc += sym;
                }
            }
        }
        let s: BitMatrix = (0..self.r)
            .map(|row| ids.iter().map(|&j| self.h_sys[row][j]).collect())
            .collect();
        (s, f)
    }

    /// Greedy path: thin the system down to singleton rows, each pinning
    /// one erased symbol. None when the singletons do not cover every
    /// erased position.
    fn recover(&self, v: &[VectorSymbol], ids: &[usize], first: Scan) -> Option<Vec<VectorSymbol>> {
        let (mut s, mut f) = self.build_system(v, ids);
        let second = first.opposite();
        loop {
            let a = self.simplify_pass(&mut s, &mut f, first);
            let b = self.simplify_pass(&mut s, &mut f, second);
            if !a && !b {
                break;
            }
        }

        let mut out: Vec<Option<VectorSymbol>> = vec![None; ids.len()];
        for (row_s, row_f) in s.iter().zip(&f) {
            if matrix::row_weight(row_s) != 1 {
                continue;
            }
            let Some(pivot) = row_s.iter().position(|&b| b != 0) else {
                continue;
            };
            // first singleton wins, duplicates are skipped
            if out[pivot].is_none() {
                out[pivot] = Some(row_f.clone());
            }
        }
        out.into_iter().collect()
    }

    /// One weight-minimising sweep in the given scan order, mirrored on
    /// the free-term column. Returns whether any row changed.
    fn simplify_pass(&self, s: &mut BitMatrix, f: &mut [VectorSymbol], dir: Scan) -> bool {
        let order = dir.order(self.r);
        let mut changed = false;
        for &i in &order {
            for &j in &order {
                if i == j {
                    continue;
                }
                let weight = matrix::row_weight(&s[i]);
                if weight == 0 {
                    continue;
                }
                let candidate: Vec<u8> =
                    s[i].iter().zip(&s[j]).map(|(a, b)| a ^ b).collect();
                if matrix::row_weight(&candidate) < weight {
                    s[i] = candidate;
                    let fj = f[j].clone();
                    f[i] += &fj;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Deterministic fallback: Gaussian elimination with partial pivoting
    /// over GF(2) on (S | f), then back-substitution. None when the
    /// submatrix rank is short of the erasure count.
    fn recover_gauss(&self, v: &[VectorSymbol], ids: &[usize]) -> Option<Vec<VectorSymbol>> {
        let (mut s, mut f) = self.build_system(v, ids);
        let cols = ids.len();
        for col in 0..cols {
            let pivot = (col..self.r).find(|&i| s[i][col] != 0)?;
            s.swap(col, pivot);
            f.swap(col, pivot);
            for i in col + 1..self.r {
                if s[i][col] != 0 {
                    let src = s[col].clone();
                    for (d, &x) in s[i].iter_mut().zip(&src) {
                        *d ^= x;
                    }
                    let fc = f[col].clone();
                    f[i] += &fc;
                }
            }
        }
        let mut out = vec![VectorSymbol::zero(self.m); cols];
        for col in (0..cols).rev() {
            let mut val = f[col].clone();
            for after in col + 1..cols {
                if s[col][after] != 0 {
                    val += &out[after];
                }
            }
            out[col] = val;
        }
        Some(out)
    }
}

/// Parity-check matrix of the binary (23, 12, 7) Golay code.
///
/// The rows are the 11 in-range shifts of the reversed check polynomial
/// h(x) = (x^23 + 1) / g(x) with g(x) = x^11 + x^9 + x^7 + x^6 + x^5 + x + 1;
/// h factors as (x + 1) times the reciprocal generator, so it is computed
/// by one shift-xor instead of a polynomial division.
pub fn golay_parity_check() -> BitMatrix {
    const G2: u32 = 0b1100_0111_0101; // x^11 + x^10 + x^6 + x^5 + x^4 + x^2 + 1
    let h_poly = G2 ^ (G2 << 1); // degree 12
    let mut h = vec![vec![0u8; 23]; 11];
    for (i, row) in h.iter_mut().enumerate() {
        for j in 0..=12 {
            row[i + j] = ((h_poly >> (12 - j)) & 1) as u8;
        }
    }
    h
}
