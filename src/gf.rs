//! GF(p^q) as index⇄element tables built from an LFSR orbit.
//!
//! Every element has two faces: a vector "state" over Z_p and an integer
//! index, the exponent of the primitive element alpha. Index `-1` is
//! reserved for the zero element and the unit state `[1, 0, ..., 0]` is
//! `alpha^0` = index 0. The tables are complete exactly when the generator
//! polynomial is primitive; a short orbit rejects the polynomial.

use std::collections::HashMap;

use crate::lfsr::Lfsr;
use crate::Error;

/// Index of the additive zero.
pub const ZERO_IDX: i32 = -1;

/// Field element in vector form: q coordinates over Z_p.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldState {
    p: u32,
    cells: Vec<u32>,
}

impl FieldState {
    pub fn new(p: u32, cells: Vec<u32>) -> Self {
        let cells = cells.into_iter().map(|c| c % p).collect();
        Self { p, cells }
    }

    pub fn zero(p: u32, q: usize) -> Self {
        Self { p, cells: vec![0; q] }
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn is_zero(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// Component-wise sum mod p.
    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.p, other.p);
        debug_assert_eq!(self.cells.len(), other.cells.len());
        let cells = self
            .cells
            .iter()
            .zip(&other.cells)
            .map(|(a, b)| (a + b) % self.p)
            .collect();
        Self { p: self.p, cells }
    }

    /// Component-wise difference mod p.
    pub fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.p, other.p);
        debug_assert_eq!(self.cells.len(), other.cells.len());
        let cells = self
            .cells
            .iter()
            .zip(&other.cells)
            .map(|(a, b)| (a + self.p - b) % self.p)
            .collect();
        Self { p: self.p, cells }
    }
}

/// Index⇄element tables plus arithmetic for GF(p^q).
#[derive(Debug)]
pub struct Field {
    p: u32,
    q: usize,
    /// Multiplicative group order, p^q - 1.
    n: usize,
    /// Dense element table addressed by `idx + 1`; slot 0 holds the zero.
    elems: Vec<FieldState>,
    /// Reverse mapping, state cells -> index.
    index: HashMap<Vec<u32>, i32>,
}

impl Field {
    /// Enumerate GF(p^q) by walking the LFSR orbit of `g_poly`.
    ///
    /// Fails with [`Error::PolynomialNotPrimitive`] when the orbit closes
    /// before all p^q - 1 nonzero elements have appeared.
    pub fn build(p: u32, g_poly: &[u32]) -> Result<Self, Error> {
        let q = g_poly.len();
        let order = (p as usize).pow(q as u32);

        let mut gen = Lfsr::new(g_poly, p);
        gen.set_unit();
        let unit = gen.state().to_vec();

        let mut elems = Vec::with_capacity(order);
        let mut index = HashMap::with_capacity(order);
        elems.push(FieldState::zero(p, q));
        index.insert(vec![0; q], ZERO_IDX);
        elems.push(FieldState::new(p, unit.clone()));
        index.insert(unit.clone(), 0);

        for idx in 1..order as i32 {
            gen.next(0);
            if gen.is_state(&unit) {
                break;
            }
            let cells = gen.state().to_vec();
            elems.push(FieldState::new(p, cells.clone()));
            index.insert(cells, idx);
        }

        if elems.len() != order {
            return Err(Error::PolynomialNotPrimitive { p });
        }

        Ok(Self {
            p,
            q,
            n: order - 1,
            elems,
            index,
        })
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Field order p^q.
    pub fn order(&self) -> usize {
        self.n + 1
    }

    /// Multiplicative group order, p^q - 1.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Element for an index in `[-1, n)`.
    pub fn element(&self, idx: i32) -> &FieldState {
        &self.elems[(idx + 1) as usize]
    }

    /// Index of a state; the state must belong to this field.
    pub fn index_of(&self, st: &FieldState) -> i32 {
        self.index[st.cells()]
    }

    /// Sum of two elements given by index.
    pub fn add(&self, i: i32, j: i32) -> i32 {
        let sum = self.element(self.norm(i)).add(self.element(self.norm(j)));
        self.index[sum.cells()]
    }

    /// Difference of two elements given by index.
    pub fn sub(&self, i: i32, j: i32) -> i32 {
        let diff = self.element(self.norm(i)).sub(self.element(self.norm(j)));
        self.index[diff.cells()]
    }

    /// Product of two elements given by index: exponent addition mod n,
    /// with zero absorbing.
    pub fn mult(&self, i: i32, j: i32) -> i32 {
        if i < 0 || j < 0 {
            ZERO_IDX
        } else {
            ((i as usize + j as usize) % self.n) as i32
        }
    }

    /// Index-sorted (index, state) listing, zero first.
    pub fn ordered(&self) -> Vec<(i32, &FieldState)> {
        self.elems
            .iter()
            .enumerate()
            .map(|(slot, st)| (slot as i32 - 1, st))
            .collect()
    }

    fn norm(&self, i: i32) -> i32 {
        if i < 0 {
            ZERO_IDX
        } else {
            i % self.n as i32
        }
    }
}
