//! Concatenated codec: outer block code over vector symbols, inner
//! Reed-Solomon per row.
//!
//! Encode: the frame rows become Normal vector symbols, the outer code
//! appends its parity symbols, and every symbol's scalars are RS-encoded
//! into one channel row. Decode reverses the pipeline: each row is
//! syndrome-checked and corrected (or the whole row erased), then the
//! outer code recovers the erased rows as unknowns of a linear system.

use log::debug;

use crate::gf::Field;
use crate::matrix::BitMatrix;
use crate::outer::OuterCode;
use crate::rs::RsCodec;
use crate::symbol::VectorSymbol;
use crate::Error;

/// Outer-code selection.
#[derive(Debug, Clone)]
pub enum OuterSpec {
    /// Extended Hamming with `outer_parity` check symbols: N = 2^(R-1), D = 4.
    ExtendedHamming,
    /// Caller-supplied parity-check matrix and its code distance.
    ParityCheck { h: BitMatrix, distance: usize },
}

/// Construction parameters of the concatenated codec.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Field characteristic. The XOR-based outer layer requires 2.
    pub p: u32,
    /// Field extension degree.
    pub q: usize,
    /// Generator polynomial coefficients, length `q`, primitive over GF(p).
    pub g_poly: Vec<u32>,
    /// Inner RS check symbol count.
    pub inner_parity: usize,
    /// Outer check symbol count.
    pub outer_parity: usize,
    /// Inner scalars per outer symbol; must equal the RS information length.
    pub symbol_len: usize,
    /// Outer-code selection.
    pub outer: OuterSpec,
}

impl Default for CodecConfig {
    /// RS(15, 10) over GF(2^4) inside an extended Hamming (32, 26, 4).
    fn default() -> Self {
        Self {
            p: 2,
            q: 4,
            g_poly: vec![1, 0, 0, 1],
            inner_parity: 5,
            outer_parity: 6,
            symbol_len: 10,
            outer: OuterSpec::ExtendedHamming,
        }
    }
}

impl CodecConfig {
    /// RS(15, 10) over GF(2^4) inside the (23, 12, 7) binary Golay code.
    pub fn golay() -> Self {
        Self {
            outer_parity: 11,
            outer: OuterSpec::ParityCheck {
                h: crate::outer::golay_parity_check(),
                distance: 7,
            },
            ..Self::default()
        }
    }
}

/// Per-frame decode counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Rows the inner decoder could not correct.
    pub erased_rows: usize,
    /// Whether the outer recovery needed a strategy change.
    pub strategy_flipped: bool,
}

/// Concatenated encoder/decoder. All tables are built once at
/// construction; the only mutable knob afterwards is the boundary layout.
pub struct Codec {
    rs: RsCodec,
    outer: OuterCode,
}

impl Codec {
    pub fn new(cfg: CodecConfig) -> Result<Self, Error> {
        if cfg.p != 2 {
            return Err(Error::BadParameters {
                reason: format!("outer XOR layer requires characteristic 2, got {}", cfg.p),
            });
        }
        if cfg.g_poly.len() != cfg.q {
            return Err(Error::BadParameters {
                reason: format!(
                    "generator polynomial has {} coefficients, expected q = {}",
                    cfg.g_poly.len(),
                    cfg.q
                ),
            });
        }
        let field = Field::build(cfg.p, &cfg.g_poly)?;
        if field.order() > 256 {
            return Err(Error::BadParameters {
                reason: format!("field order {} does not fit the byte wire", field.order()),
            });
        }
        let rs = RsCodec::new(field, cfg.inner_parity)?;
        if cfg.symbol_len != rs.k() {
            return Err(Error::BadParameters {
                reason: format!(
                    "symbol_len {} must equal the RS information length {}",
                    cfg.symbol_len,
                    rs.k()
                ),
            });
        }
        let outer = match cfg.outer {
            OuterSpec::ExtendedHamming => {
                OuterCode::extended_hamming(cfg.outer_parity, cfg.symbol_len)?
            }
            OuterSpec::ParityCheck { h, distance } => {
                let code = OuterCode::from_parity_check(h, distance, cfg.symbol_len)?;
                if code.parity() != cfg.outer_parity {
                    return Err(Error::BadParameters {
                        reason: format!(
                            "outer matrix has {} rows, expected outer_parity = {}",
                            code.parity(),
                            cfg.outer_parity
                        ),
                    });
                }
                code
            }
        };
        debug!(
            "codec ready: RS({}, {}) inside ({}, {}, {})",
            rs.n(),
            rs.k(),
            outer.n(),
            outer.k(),
            outer.distance()
        );
        Ok(Self { rs, outer })
    }

    /// Inner codeword length — scalars per channel row.
    pub fn n_inner(&self) -> usize {
        self.rs.n()
    }

    /// Inner information length — scalars per frame row.
    pub fn k_inner(&self) -> usize {
        self.rs.k()
    }

    /// Channel rows per frame.
    pub fn n_outer(&self) -> usize {
        self.outer.n()
    }

    /// Frame rows.
    pub fn k_outer(&self) -> usize {
        self.outer.k()
    }

    pub fn is_systematic(&self) -> bool {
        self.outer.is_systematic()
    }

    /// Choose the outer wire layout; see [`OuterCode::set_systematic`].
    pub fn set_systematic(&mut self, on: bool) {
        self.outer.set_systematic(on);
    }

    /// Encode a `k_outer` x `k_inner` frame into an `n_outer` x `n_inner`
    /// channel matrix. Scalars use the +1 offset storage convention:
    /// integers in `[0, n_inner]` with 0 for the zero element.
    pub fn encode(&self, frame: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, Error> {
        assert_eq!(frame.len(), self.outer.k(), "frame must have k_outer rows");
        let max = self.rs.n() as u8;
        let mut symbols = Vec::with_capacity(frame.len());
        for (i, row) in frame.iter().enumerate() {
            if row.len() != self.rs.k() || row.iter().any(|&s| s > max) {
                return Err(Error::BadParameters {
                    reason: format!(
                        "frame row {i} must hold {} scalars in 0..={max}",
                        self.rs.k()
                    ),
                });
            }
            symbols.push(VectorSymbol::normal(row.clone()));
        }
        let encoded = self.outer.encode(&symbols)?;
        Ok(encoded.iter().map(|sym| self.rs.encode(sym.data())).collect())
    }

    /// Decode an `n_outer` x `n_inner` channel matrix.
    ///
    /// Returns the recovered frame, or `None` when the erasure pattern is
    /// beyond the outer code; either way the stats describe what happened
    /// and the codec stays usable for further frames.
    pub fn decode(&self, channel: &[Vec<u8>]) -> (Option<Vec<Vec<u8>>>, DecodeStats) {
        assert_eq!(
            channel.len(),
            self.outer.n(),
            "channel must have n_outer rows"
        );
        let mut stats = DecodeStats::default();
        let max = self.rs.n() as u8;

        let received: Vec<VectorSymbol> = channel
            .iter()
            .map(|row| {
                assert_eq!(row.len(), self.rs.n(), "channel row must hold n_inner scalars");
                if row.iter().any(|&s| s > max) {
                    // out-of-range scalar: damaged beyond the storage
                    // convention, treat like an uncorrectable row
                    stats.erased_rows += 1;
                    return VectorSymbol::erased(self.rs.k());
                }
                let mut word = row.clone();
                match self.rs.correct(&mut word) {
                    Ok(()) => VectorSymbol::normal(self.rs.decode(&word)),
                    Err(_) => {
                        stats.erased_rows += 1;
                        VectorSymbol::erased(self.rs.k())
                    }
                }
            })
            .collect();

        match self.outer.decode(&received) {
            Ok((info, report)) => {
                stats.strategy_flipped = report.strategy_flipped;
                let frame = info.into_iter().map(VectorSymbol::into_data).collect();
                (Some(frame), stats)
            }
            Err(err) => {
                debug!("frame dropped: {err}");
                (None, stats)
            }
        }
    }
}
