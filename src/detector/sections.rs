//! Bubble group analysis: equal-width strips, dark-pixel histogram, standout test

use std::ops::Range;

use crate::config::ReaderConfig;
use crate::error::{FormError, FormResult};
use crate::models::Region;
use crate::utils::LumaPlane;
use crate::utils::binarization::count_dark_pixels;

/// Histogram of one bubble group and the strip that stands out, if any
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReading {
    counts: Vec<usize>,
    boundaries: Vec<u32>,
    mean: f64,
    winner: Option<usize>,
}

/// Strip edges for `sections` strips across `width` pixels.
///
/// Returns `sections + 1` edges; strip `i` covers `edges[i]..edges[i + 1]`.
/// Strip `i` starts at `floor(i * width / sections)` and the final strip ends at
/// `width`, so it picks up whatever the division leaves over.
pub fn strip_boundaries(width: u32, sections: usize) -> Vec<u32> {
    let mut edges: Vec<u32> = (0..sections)
        .map(|i| (i as u64 * width as u64 / sections as u64) as u32)
        .collect();
    edges.push(width);
    edges
}

impl SectionReading {
    /// Analyse a plane that already covers exactly one bubble group
    pub fn from_plane(
        gray: &LumaPlane,
        sections: usize,
        dark_threshold: u8,
        significance_factor: f64,
    ) -> FormResult<Self> {
        let (width, height) = (gray.width(), gray.height());
        if sections == 0 || width == 0 || height == 0 {
            return Err(FormError::InvalidRegion {
                width,
                height,
                sections,
            });
        }

        let boundaries = strip_boundaries(width, sections);
        let counts: Vec<usize> = boundaries
            .windows(2)
            .map(|edge| count_dark_pixels(gray, edge[0]..edge[1], dark_threshold))
            .collect();

        let total: usize = counts.iter().sum();
        let mean = total as f64 / sections as f64;

        // Strict `>` keeps the leftmost strip on ties
        let mut max_count = 0usize;
        let mut max_index = None;
        for (i, &count) in counts.iter().enumerate() {
            if count > max_count {
                max_count = count;
                max_index = Some(i);
            }
        }

        let winner = if mean == 0.0 {
            if max_count > 0 { max_index } else { None }
        } else if max_count as f64 > (1.0 + significance_factor) * mean {
            max_index
        } else {
            None
        };

        Ok(Self {
            counts,
            boundaries,
            mean,
            winner,
        })
    }

    /// 0-based index of the standout strip, 0 when nothing stands out.
    ///
    /// With ten strips the index is the digit. Strip 0 winning and no mark at
    /// all both read as 0; use [`SectionReading::winner`] to tell them apart.
    pub fn standout(&self) -> usize {
        self.winner.unwrap_or(0)
    }

    /// Standout strip, `None` when no strip is significantly darker than the mean
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Dark-pixel count per strip, left to right
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Mean dark-pixel count
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Strip edges relative to the group's left edge
    pub fn boundaries(&self) -> &[u32] {
        &self.boundaries
    }

    /// Column span of strip `i`
    pub fn strip(&self, i: usize) -> Option<Range<u32>> {
        let start = *self.boundaries.get(i)?;
        let end = *self.boundaries.get(i + 1)?;
        Some(start..end)
    }

    /// Width of every strip
    pub fn strip_widths(&self) -> Vec<u32> {
        self.boundaries.windows(2).map(|e| e[1] - e[0]).collect()
    }
}

/// Analyse the bubble group covered by `region`.
///
/// Zero-area regions and a zero section count are rejected with
/// [`FormError::InvalidRegion`]; regions outside the scan with
/// [`FormError::RegionOutOfBounds`].
pub fn analyze_sections(
    luma: &LumaPlane,
    region: Region,
    sections: usize,
    config: &ReaderConfig,
) -> FormResult<SectionReading> {
    if sections == 0 || region.is_empty() {
        return Err(FormError::InvalidRegion {
            width: region.width(),
            height: region.height(),
            sections,
        });
    }

    let gray = luma.crop(region)?;
    SectionReading::from_plane(
        &gray,
        sections,
        config.dark_threshold,
        config.significance_factor,
    )
}
