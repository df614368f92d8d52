//! Diagnostic overlay
//!
//! The pipeline reports every probed rectangle to an [`Annotator`]. Decoding
//! never reads anything back from it, so an overlay cannot change results.

use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use tracing::{debug, warn};

use crate::detector::sections::SectionReading;
use crate::models::Region;

const OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
const DIVIDER: Rgb<u8> = Rgb([255, 0, 0]);
const MARKER: Rgb<u8> = Rgb([0, 0, 255]);
const LABEL: Rgb<u8> = Rgb([0, 0, 255]);

/// DejaVu Sans Mono, Bitstream Vera license (see `assets/`)
const LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");
const LABEL_PX: f32 = 16.0;
/// Section labels sit this far right of the group's left edge
const SECTION_LABEL_DX: i64 = 200;

/// Receives the rectangles probed while decoding a form
pub trait Annotator {
    /// A key square was probed; `text` is the decoded payload or empty
    fn key_region(&mut self, _region: Region, _text: &str) {}

    /// A bubble group was analysed
    fn section_region(&mut self, _region: Region, _reading: &SectionReading) {}
}

/// Discards every annotation
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnnotator;

impl Annotator for NoopAnnotator {}

/// Draws probed rectangles onto a copy of the scan
#[derive(Debug, Clone)]
pub struct OverlayAnnotator {
    canvas: RgbImage,
    labels: Vec<(Region, String)>,
    font: Option<Font<'static>>,
}

impl OverlayAnnotator {
    /// Start an overlay from a copy of the scan
    pub fn new(scan: &RgbImage) -> Self {
        let font = Font::try_from_bytes(LABEL_FONT);
        if font.is_none() {
            warn!("label font unreadable, overlay text disabled");
        }
        Self {
            canvas: scan.clone(),
            labels: Vec::new(),
            font,
        }
    }

    /// Text attached to each probed rectangle, in probe order
    pub fn labels(&self) -> &[(Region, String)] {
        &self.labels
    }

    /// Annotated image
    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    /// Take the annotated image
    pub fn into_image(self) -> RgbImage {
        self.canvas
    }

    fn text(&mut self, x: i64, y: i64, text: &str) {
        if text.is_empty() || x >= self.canvas.width() as i64 || y >= self.canvas.height() as i64 {
            return;
        }
        let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
            return;
        };
        if let Some(font) = &self.font {
            draw_text_mut(&mut self.canvas, LABEL, x, y, Scale::uniform(LABEL_PX), font, text);
        }
    }

    // Two nested outlines, the scan is large enough that 1px disappears
    fn outline(&mut self, region: Region) {
        if let Some(rect) = to_rect(region) {
            draw_hollow_rect_mut(&mut self.canvas, rect, OUTLINE);
        }
        if region.width() > 2 && region.height() > 2 {
            let inner = Region::new(region.x0 + 1, region.y0 + 1, region.x1 - 1, region.y1 - 1);
            if let Some(rect) = to_rect(inner) {
                draw_hollow_rect_mut(&mut self.canvas, rect, OUTLINE);
            }
        }
    }
}

impl Annotator for OverlayAnnotator {
    fn key_region(&mut self, region: Region, text: &str) {
        self.outline(region);
        // just below the key square
        self.text(region.x0 as i64, region.y1 as i64 + 2, text);
        debug!(%region, text, "key region");
        self.labels.push((region, text.to_string()));
    }

    fn section_region(&mut self, region: Region, reading: &SectionReading) {
        self.outline(region);

        for &x in reading.boundaries().iter().skip(1) {
            if x >= region.width() {
                continue;
            }
            let x = (region.x0 + x) as f32;
            draw_line_segment_mut(
                &mut self.canvas,
                (x, region.y0 as f32),
                (x, region.y1 as f32),
                DIVIDER,
            );
        }

        if let Some(strip) = reading.winner().and_then(|i| reading.strip(i)) {
            let marker = Region::new(
                region.x0 + strip.start,
                region.y0.saturating_sub(6),
                region.x0 + strip.end,
                region.y0.saturating_sub(2),
            );
            if let Some(rect) = to_rect(marker) {
                draw_filled_rect_mut(&mut self.canvas, rect, MARKER);
            }
        }

        let text = format!("Standout: {}", reading.standout());
        self.text(
            region.x0 as i64 + SECTION_LABEL_DX,
            region.y0 as i64 - LABEL_PX as i64 - 8,
            &text,
        );
        debug!(%region, counts = ?reading.counts(), "{text}");
        self.labels.push((region, text));
    }
}

fn to_rect(region: Region) -> Option<Rect> {
    if region.is_empty() {
        return None;
    }
    Some(Rect::at(region.x0 as i32, region.y0 as i32).of_size(region.width(), region.height()))
}
