//! Luminance plane of a scan
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (77*R + 150*G + 29*B + 128) >> 8
//! The coefficients sum to 256, so a neutral grey keeps its level.
//!
//! The whole scan is converted once, rows in parallel, and every probed
//! rectangle is cropped out of the resulting plane.

use image::RgbImage;
use rayon::prelude::*;

use crate::error::{FormError, FormResult};
use crate::models::Region;

/// Coefficients for grayscale conversion, scaled by 256
const COEF_R: i32 = 77;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;
const ROUND: i32 = 128;

/// Luminance of one RGB pixel
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as i32 + COEF_G * g as i32 + COEF_B * b as i32 + ROUND) >> 8;
    lum.min(255) as u8
}

/// Single-channel 8-bit image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaPlane {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LumaPlane {
    /// Wrap raw luminance bytes. Returns `None` when the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Convert an RGB scan, processing pixel rows in parallel
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let w = width as usize;
        let rgb = image.as_raw();
        let mut data = vec![0u8; w * height as usize];

        if w > 0 {
            data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
                let row_start = y * w * 3;
                for (x, out) in row.iter_mut().enumerate() {
                    let idx = row_start + x * 3;
                    *out = luma(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
                }
            });
        }

        Self {
            width,
            height,
            data,
        }
    }

    /// Plane width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major bytes
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Luminance at (x, y); callers stay inside the plane
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// One pixel row
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Copy out the pixels covered by `region`
    pub fn crop(&self, region: Region) -> FormResult<LumaPlane> {
        if !region.fits_within(self.width, self.height) {
            return Err(FormError::RegionOutOfBounds {
                region,
                width: self.width,
                height: self.height,
            });
        }

        let (x0, x1) = (region.x0 as usize, region.x1 as usize);
        let mut data = Vec::with_capacity(region.width() as usize * region.height() as usize);
        for y in region.y0..region.y1 {
            data.extend_from_slice(&self.row(y)[x0..x1]);
        }

        Ok(LumaPlane {
            width: region.width(),
            height: region.height(),
            data,
        })
    }
}
