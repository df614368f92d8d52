use std::ops::Range;

use super::grayscale::LumaPlane;

/// Count pixels darker than `threshold` inside a column span of the plane.
///
/// A pixel is dark when its luminance is strictly below `threshold`. Columns
/// outside the plane are ignored.
pub fn count_dark_pixels(gray: &LumaPlane, columns: Range<u32>, threshold: u8) -> usize {
    let start = columns.start.min(gray.width()) as usize;
    let end = columns.end.min(gray.width()) as usize;
    if start >= end {
        return 0;
    }

    (0..gray.height())
        .map(|y| {
            gray.row(y)[start..end]
                .iter()
                .filter(|&&v| v < threshold)
                .count()
        })
        .sum()
}
