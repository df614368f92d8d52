//! Utility functions for image processing
//!
//! - Grayscale conversion (RGB to a luminance plane, region cropping)
//! - Binarization (fixed-threshold dark-pixel counting)

/// Fixed-threshold dark-pixel counting
pub mod binarization;
/// RGB to luminance conversion and cropping
pub mod grayscale;

pub use grayscale::LumaPlane;
