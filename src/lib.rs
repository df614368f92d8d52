//! bubble_tally - read scanned tally forms into a keyed counter store
//!
//! Each form row carries a QR key and two groups of ten bubbles (tens and
//! ones). The reader decodes the key, picks the marked bubble in each group,
//! and adds the two-digit count to a shared [`CounterStore`].
//!
//! ```no_run
//! use bubble_tally::{CounterStore, decode_document_path};
//!
//! let store = CounterStore::new();
//! let report = decode_document_path("scan.png", &store)?;
//! println!("{} rows applied", report.rows_applied());
//! for entry in store.snapshot() {
//!     println!("{} {} {}", entry.key, entry.display_name, entry.value);
//! }
//! # Ok::<(), bubble_tally::FormError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Diagnostic overlay of probed regions
pub mod annotate;
/// Reader thresholds and environment overrides
pub mod config;
/// Row key decoding (QR)
pub mod decoder;
/// Bubble mark detection
pub mod detector;
/// Error taxonomy
pub mod error;
/// Fixed form geometry
pub mod layout;
/// Core data structures (Region, Entry)
pub mod models;
/// Row-by-row decode of a whole form
pub mod pipeline;
/// Shared keyed tally
pub mod store;
/// Image loading and saving helpers
pub mod tools;
/// Utility functions (grayscale, binarization)
pub mod utils;

pub use annotate::{Annotator, NoopAnnotator, OverlayAnnotator};
pub use config::ReaderConfig;
pub use decoder::{KeyReader, QrKeyReader};
pub use detector::{SectionReading, analyze_sections};
pub use error::{FormError, FormResult};
pub use layout::{FormLayout, RowRegions, row_regions};
pub use models::{Entry, Region};
pub use pipeline::{DecodeReport, FormReader, RowOutcome, decode_document, decode_document_path};
pub use store::CounterStore;
pub use utils::LumaPlane;
