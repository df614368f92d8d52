use rqrr::PreparedImage;

use crate::error::{FormError, FormResult};
use crate::models::Region;
use crate::utils::LumaPlane;

/// Regions whose luminance spread is below this are flat paper
const MIN_CONTRAST: u8 = 16;

/// Source of row keys
pub trait KeyReader {
    /// Read the key printed inside `region` of the scan.
    ///
    /// An `Ok` payload may be empty; the pipeline treats that like a failure.
    fn read_key(&self, luma: &LumaPlane, region: Region) -> FormResult<String>;
}

/// Reads keys from QR symbols
#[derive(Debug, Default, Clone, Copy)]
pub struct QrKeyReader;

impl KeyReader for QrKeyReader {
    fn read_key(&self, luma: &LumaPlane, region: Region) -> FormResult<String> {
        decode_qr_region(luma, region)
    }
}

/// Crop `region` out of the scan and decode the QR symbol inside it
pub fn decode_qr_region(luma: &LumaPlane, region: Region) -> FormResult<String> {
    let gray = luma.crop(region)?;
    decode_qr(&gray)
}

/// Decode the first readable QR symbol in a luminance plane
///
/// Returns [`FormError::RegionDecode`] when no symbol is found or none of the
/// symbols found can be read.
pub fn decode_qr(gray: &LumaPlane) -> FormResult<String> {
    let (width, height) = (gray.width(), gray.height());
    if width == 0 || height == 0 {
        return Err(FormError::RegionDecode("empty region".to_string()));
    }
    let (lo, hi) = gray
        .as_raw()
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if hi - lo < MIN_CONTRAST {
        return Err(FormError::RegionDecode("flat region".to_string()));
    }

    let mut prepared = PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| gray.get(x as u32, y as u32),
    );
    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(FormError::RegionDecode("no QR symbol found".to_string()));
    }

    let mut last_error = String::new();
    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => return Ok(content),
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(FormError::RegionDecode(last_error))
}
