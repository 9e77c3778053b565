//! Concatenated forward-error-correction core.
//!
//! An inner Reed-Solomon code over GF(2^4) detects and corrects symbol
//! errors per channel row; rows it cannot repair are declared erased, and
//! an outer binary block code (extended Hamming by default, Golay as a
//! preset) recovers the erased rows by solving a linear system over GF(2).
//!
//! # Example
//!
//! ```
//! use cascade_fec::{Codec, CodecConfig};
//!
//! let codec = Codec::new(CodecConfig::default()).unwrap();
//! let frame: Vec<Vec<u8>> = (0..codec.k_outer())
//!     .map(|i| (0..codec.k_inner()).map(|j| ((i + j) % 16) as u8).collect())
//!     .collect();
//!
//! let mut channel = codec.encode(&frame).unwrap();
//! channel[3][8] ^= 0b0101; // a symbol error survives the channel
//!
//! let (decoded, stats) = codec.decode(&channel);
//! assert_eq!(decoded.unwrap(), frame);
//! assert_eq!(stats.erased_rows, 0);
//! ```

pub mod codec;
pub mod gf;
pub mod lfsr;
pub mod matrix;
pub mod outer;
pub mod rs;
pub mod symbol;

pub use codec::{Codec, CodecConfig, DecodeStats, OuterSpec};
pub use gf::{Field, FieldState};
pub use lfsr::Lfsr;
pub use outer::{golay_parity_check, ErasureReport, OuterCode};
pub use rs::RsCodec;
pub use symbol::{SymbolStatus, VectorSymbol};

/// Errors returned by construction and decoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The LFSR orbit closed before enumerating all of GF(p^q).
    #[error("generator polynomial is not primitive over GF({p})")]
    PolynomialNotPrimitive { p: u32 },

    /// No identity can be formed on the requested column set.
    #[error("parity-check matrix cannot form an identity on the requested columns")]
    ParityMatrixRankDeficient,

    /// Empty, ragged, or wider-than-tall parity-check matrix.
    #[error("parity-check matrix has invalid shape ({rows} x {cols})")]
    ParityMatrixShape { rows: usize, cols: usize },

    /// Inconsistent construction parameters or malformed caller data.
    #[error("invalid parameters: {reason}")]
    BadParameters { reason: String },

    /// More erased symbols than outer check symbols.
    #[error("{erased} erasures exceed the {max} outer check symbols")]
    TooManyErasures { erased: usize, max: usize },

    /// Inner codeword beyond the reach of both correction tables.
    #[error("codeword is uncorrectable")]
    UncorrectableRow,

    /// Erasure recovery failed in both scan orders and the Gaussian
    /// fallback.
    #[error("erasure pattern is unrecoverable")]
    UnrecoverableErasurePattern,
}
