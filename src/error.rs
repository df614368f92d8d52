use std::path::PathBuf;

use thiserror::Error;

use crate::models::Region;

/// Errors raised while reading a scanned form.
///
/// Everything except [`FormError::ImageLoad`] and [`FormError::ImageSave`] is
/// row-local: the pipeline logs it and moves on to the next row.
#[derive(Error, Debug)]
pub enum FormError {
    /// No QR symbol found in the key region, or the symbol could not be read
    #[error("QR decode failed: {0}")]
    RegionDecode(String),

    /// Zero-area rectangle or zero sections handed to the bubble analyzer
    #[error("invalid region {width}x{height} with {sections} sections")]
    InvalidRegion {
        /// Region width in pixels
        width: u32,
        /// Region height in pixels
        height: u32,
        /// Requested section count
        sections: usize,
    },

    /// Rectangle reaches outside the source image
    #[error("region {region} exceeds image bounds {width}x{height}")]
    RegionOutOfBounds {
        /// The requested rectangle
        region: Region,
        /// Source image width
        width: u32,
        /// Source image height
        height: u32,
    },

    /// QR symbol decoded to an empty payload
    #[error("QR payload is empty")]
    EmptyKey,

    /// Source image missing or corrupt
    #[error("cannot load image {path}: {source}")]
    ImageLoad {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// Diagnostic overlay could not be written
    #[error("cannot save image {path}: {source}")]
    ImageSave {
        /// Destination path
        path: PathBuf,
        /// Underlying encoder error
        #[source]
        source: image::ImageError,
    },
}

/// Result alias used across the crate
pub type FormResult<T> = Result<T, FormError>;
