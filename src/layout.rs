//! Fixed row geometry of the tally form
//!
//! The form carries [`ROW_COUNT`] rows. Each row has a QR key square on the
//! left followed by two horizontal groups of ten bubbles (tens, then ones).
//! Coordinates are pixels at the scan resolution the form was printed for.

use crate::models::Region;

/// Number of rows on a form
pub const ROW_COUNT: usize = 21;
/// Vertical distance between consecutive rows, in pixels
pub const ROW_PITCH: f32 = 83.47;

/// Key square of row 0
pub const KEY_REGION: Region = Region {
    x0: 450,
    y0: 540,
    x1: 515,
    y1: 605,
};
/// Tens bubble group of row 0
pub const TENS_REGION: Region = Region {
    x0: 534,
    y0: 541,
    x1: 951,
    y1: 576,
};
/// Left edge of the ones bubble group; it shares the tens group's size
pub const ONES_X: u32 = 980;

/// Bubbles per digit group (digits 0-9)
pub const DIGIT_SECTIONS: usize = 10;

/// The three rectangles probed for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRegions {
    /// QR key square
    pub key: Region,
    /// Tens digit bubbles
    pub tens: Region,
    /// Ones digit bubbles
    pub ones: Region,
}

/// Row geometry for a form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormLayout {
    /// Number of rows to probe
    pub rows: usize,
    /// Vertical pitch between rows
    pub pitch: f32,
    /// Key square of the first row
    pub key: Region,
    /// Tens group of the first row
    pub tens: Region,
    /// Left edge of the ones group
    pub ones_x: u32,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            rows: ROW_COUNT,
            pitch: ROW_PITCH,
            key: KEY_REGION,
            tens: TENS_REGION,
            ones_x: ONES_X,
        }
    }
}

impl FormLayout {
    /// Vertical offset of `row` relative to the first row (truncated, saturating)
    pub fn row_offset(&self, row: usize) -> u32 {
        (row as f32 * self.pitch) as u32
    }

    /// Rectangles of `row`. Arithmetic only; the result is not checked against any image.
    pub fn row_regions(&self, row: usize) -> RowRegions {
        let dy = self.row_offset(row);
        let ones = Region::at(
            self.ones_x,
            self.tens.y0,
            self.tens.width(),
            self.tens.height(),
        );
        RowRegions {
            key: self.key.offset_y(dy),
            tens: self.tens.offset_y(dy),
            ones: ones.offset_y(dy),
        }
    }

    /// Rectangles of every row, in order
    pub fn iter_rows(&self) -> impl Iterator<Item = RowRegions> + '_ {
        (0..self.rows).map(move |row| self.row_regions(row))
    }

    /// True when every rectangle of every row lies inside a `width` x `height` image
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.iter_rows().all(|r| {
            r.key.fits_within(width, height)
                && r.tens.fits_within(width, height)
                && r.ones.fits_within(width, height)
        })
    }
}

/// Rectangles of `row` on the standard form
pub fn row_regions(row: usize) -> RowRegions {
    FormLayout::default().row_regions(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row() {
        let r = row_regions(0);
        assert_eq!(r.key, Region::new(450, 540, 515, 605));
        assert_eq!(r.tens, Region::new(534, 541, 951, 576));
        assert_eq!(r.ones, Region::new(980, 541, 1397, 576));
    }

    #[test]
    fn test_pitch_truncates() {
        assert_eq!(FormLayout::default().row_offset(1), 83);
        assert_eq!(FormLayout::default().row_offset(3), 250);
        let last = row_regions(ROW_COUNT - 1);
        assert_eq!(last.key.y0, 540 + 1669);
        assert_eq!(last.tens.y0 - last.key.y0, 1);
    }

    #[test]
    fn test_ones_matches_tens_size() {
        for r in FormLayout::default().iter_rows() {
            assert_eq!(r.ones.width(), r.tens.width());
            assert_eq!(r.ones.height(), r.tens.height());
            assert_eq!(r.ones.y0, r.tens.y0);
            assert!(r.ones.x0 > r.tens.x1);
            assert!(r.tens.x0 > r.key.x1);
        }
    }

    #[test]
    fn test_rows_do_not_overlap() {
        let layout = FormLayout::default();
        let rows: Vec<RowRegions> = layout.iter_rows().collect();
        assert_eq!(rows.len(), ROW_COUNT);
        for pair in rows.windows(2) {
            assert!(!pair[0].key.intersects(&pair[1].key));
            assert!(!pair[0].tens.intersects(&pair[1].tens));
            assert!(!pair[0].ones.intersects(&pair[1].ones));
        }
    }

    #[test]
    fn test_oversized_pitch_saturates() {
        let layout = FormLayout {
            pitch: 1.0e12,
            ..FormLayout::default()
        };
        assert_eq!(layout.row_offset(3), u32::MAX);
        let r = layout.row_regions(3);
        assert_eq!(r.key.y1, u32::MAX);
        assert!(!r.tens.fits_within(1654, 2339));
        assert!(!layout.fits(1654, 2339));
    }

    #[test]
    fn test_fits() {
        let layout = FormLayout::default();
        assert!(layout.fits(1654, 2339));
        assert!(!layout.fits(1396, 2339));
        assert!(!layout.fits(1654, 2000));
    }
}
