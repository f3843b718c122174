//! # Retrocompressor Library
//!
//! Three independent, single-threaded compression cores sharing no
//! state:
//! * `ac` — adaptive order-0 arithmetic coding over a heap-laid
//!   frequency tree.
//! * `lzw` — LZW dictionary compression with an open-addressed hash
//!   table and a pluggable universal integer code framing the output.
//! * `lbg` — Linde-Buzo-Gray vector quantization of 24-bit RGB images,
//!   accelerated by an adaptive cubic-sector spatial index.
//!
//! ## Buffer example
//!
//! ```rs
//! use retrocompressor::lzw;
//! let data = b"ababababababababababababababababababababababababab".to_vec();
//! let settings = lzw::STD_SETTINGS;
//! let compressed = lzw::compress(&data, &settings);
//! let decompressed = lzw::expand(&compressed, &settings);
//! assert_eq!(decompressed, data);
//! ```

pub mod ac;
pub mod lbg;
pub mod lzw;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(), DYNERR>;

/// Crate-wide error kinds (spec.md §7).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid or missing argument")]
    ArgumentError,
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("truncated or malformed file format")]
    FormatError,
    #[error("arithmetic coder self-check failed: encode/decode mismatch")]
    IntegrityError,
    #[error("internal invariant violated")]
    LogicError,
}
