//! Channel symbols of the outer code.
//!
//! One outer symbol carries the information scalars of one inner codeword
//! plus a status tag. Addition is total: the XOR-sum is only meaningful
//! between Normal symbols, and the status rules below make every other
//! combination well-defined instead of a special case at each call site.

use std::ops::{Add, AddAssign};

/// Reception status of a channel symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolStatus {
    /// Never written; poisons every sum it touches.
    Uninitialized,
    /// Carries trusted data.
    Normal,
    /// Known-bad position awaiting recovery.
    Erased,
}

/// Status-tagged vector of inner scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorSymbol {
    status: SymbolStatus,
    data: Vec<u8>,
}

impl VectorSymbol {
    pub fn normal(data: Vec<u8>) -> Self {
        Self {
            status: SymbolStatus::Normal,
            data,
        }
    }

    /// All-zero Normal symbol, the identity of the XOR-sum.
    pub fn zero(m: usize) -> Self {
        Self::normal(vec![0; m])
    }

    pub fn erased(m: usize) -> Self {
        Self {
            status: SymbolStatus::Erased,
            data: vec![0; m],
        }
    }

    pub fn uninitialized(m: usize) -> Self {
        Self {
            status: SymbolStatus::Uninitialized,
            data: vec![0; m],
        }
    }

    pub fn status(&self) -> SymbolStatus {
        self.status
    }

    pub fn is_normal(&self) -> bool {
        self.status == SymbolStatus::Normal
    }

    pub fn is_erased(&self) -> bool {
        self.status == SymbolStatus::Erased
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Add for &VectorSymbol {
    type Output = VectorSymbol;

    /// XOR-sum with status propagation: Uninitialized absorbs everything,
    /// a Normal operand passes through an Erased one, and two Normals
    /// combine element-wise.
    fn add(self, rhs: &VectorSymbol) -> VectorSymbol {
        use SymbolStatus::*;
        match (self.status, rhs.status) {
            (Uninitialized, _) | (_, Uninitialized) => {
                VectorSymbol::uninitialized(self.data.len().max(rhs.data.len()))
            }
            (Normal, Normal) => {
                debug_assert_eq!(self.data.len(), rhs.data.len());
                VectorSymbol::normal(
                    self.data.iter().zip(&rhs.data).map(|(a, b)| a ^ b).collect(),
                )
            }
            (Normal, Erased) => self.clone(),
            (Erased, Normal) => rhs.clone(),
            (Erased, Erased) => VectorSymbol::erased(self.data.len()),
        }
    }
}

impl AddAssign<&VectorSymbol> for VectorSymbol {
    fn add_assign(&mut self, rhs: &VectorSymbol) {
        *self = &*self + rhs;
    }
}
