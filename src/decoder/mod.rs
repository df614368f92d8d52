//! Row key decoding
//!
//! Each row carries a QR symbol whose payload is the tally key. The pipeline
//! reaches the decoder through [`KeyReader`] so other key sources can stand in.

/// QR decoding of one key square
pub mod qr_region;

pub use qr_region::{KeyReader, QrKeyReader, decode_qr, decode_qr_region};
