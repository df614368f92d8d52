//! End-to-end decoding of synthetic tally forms
//!
//! Forms are drawn at the standard layout on a white A4 canvas. Row keys come
//! from a stub reader keyed by row position so the bubble logic and store
//! updates can be checked without rendering QR symbols; the last tests render
//! real symbols and go through the QR decoder.

use std::collections::HashMap;

use bubble_tally::detector::strip_boundaries;
use bubble_tally::layout::ROW_COUNT;
use bubble_tally::{
    CounterStore, FormError, FormLayout, FormReader, FormResult, KeyReader, LumaPlane,
    NoopAnnotator, OverlayAnnotator, ReaderConfig, Region, decode_document,
    decode_document_path, row_regions,
};
use image::{Rgb, RgbImage};
use qrcode::{Color, QrCode};

const PAGE_W: u32 = 1654;
const PAGE_H: u32 = 2339;
const WHITE: Rgb<u8> = Rgb([250, 250, 250]);
const INK: Rgb<u8> = Rgb([30, 30, 40]);

/// Keys by row: the stub looks the row up from the key square's top edge
struct RowKeys {
    by_top: HashMap<u32, String>,
}

impl RowKeys {
    fn new(rows: &[(usize, &str)]) -> Self {
        let by_top = rows
            .iter()
            .map(|&(row, key)| (row_regions(row).key.y0, key.to_string()))
            .collect();
        Self { by_top }
    }
}

impl KeyReader for RowKeys {
    fn read_key(&self, _luma: &LumaPlane, region: Region) -> FormResult<String> {
        self.by_top
            .get(&region.y0)
            .cloned()
            .ok_or_else(|| FormError::RegionDecode("no symbol".to_string()))
    }
}

fn blank_page() -> RgbImage {
    RgbImage::from_pixel(PAGE_W, PAGE_H, WHITE)
}

fn fill(img: &mut RgbImage, region: Region, color: Rgb<u8>) {
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Ink the bubble for `digit` inside a ten-bubble group
fn mark_digit(img: &mut RgbImage, group: Region, digit: usize) {
    let edges = strip_boundaries(group.width(), 10);
    // leave a margin so the mark stays inside its strip
    let bubble = Region::new(
        group.x0 + edges[digit] + 8,
        group.y0 + 6,
        group.x0 + edges[digit + 1] - 8,
        group.y1 - 6,
    );
    fill(img, bubble, INK);
}

/// Mark a two-digit count on `row`
fn mark_count(img: &mut RgbImage, row: usize, tens: Option<usize>, ones: Option<usize>) {
    let regions = row_regions(row);
    if let Some(d) = tens {
        mark_digit(img, regions.tens, d);
    }
    if let Some(d) = ones {
        mark_digit(img, regions.ones, d);
    }
}

fn stub_reader(rows: &[(usize, &str)]) -> FormReader<RowKeys> {
    FormReader::new()
        .with_config(ReaderConfig::default())
        .with_key_reader(RowKeys::new(rows))
}

#[test]
fn test_scenario_tens_zero_ones_five() {
    let mut page = blank_page();
    mark_count(&mut page, 0, Some(0), Some(5));
    let store = CounterStore::new();
    store.increment_or_create("WIDGET-1", 10);

    let report = stub_reader(&[(0, "WIDGET-1")]).decode(&page, &store, &mut NoopAnnotator);

    assert_eq!(store.get("WIDGET-1").unwrap().value, 15);
    assert_eq!(report.rows_applied(), 1);
    let row = &report.applied[0];
    assert_eq!((row.tens, row.ones, row.count, row.total), (0, 5, 5, 15));
}

#[test]
fn test_two_digit_count() {
    let mut page = blank_page();
    mark_count(&mut page, 3, Some(4), Some(7));
    mark_count(&mut page, 20, Some(9), None);
    let store = CounterStore::new();

    let report = stub_reader(&[(3, "A"), (20, "B")]).decode(&page, &store, &mut NoopAnnotator);

    assert_eq!(store.get("A").unwrap().value, 47);
    assert_eq!(store.get("B").unwrap().value, 90);
    assert_eq!(report.rows_applied(), 2);
    assert_eq!(report.blank_rows, ROW_COUNT - 2);
}

#[test]
fn test_same_key_on_several_rows_accumulates() {
    let mut page = blank_page();
    mark_count(&mut page, 1, Some(1), Some(2));
    mark_count(&mut page, 2, None, Some(3));
    let store = CounterStore::new();

    stub_reader(&[(1, "SKU"), (2, "SKU")]).decode(&page, &store, &mut NoopAnnotator);

    assert_eq!(store.get("SKU").unwrap().value, 15);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_undecodable_key_leaves_store_unchanged() {
    let mut page = blank_page();
    // marks on row 4 but no key there
    mark_count(&mut page, 4, Some(2), Some(2));
    let store = CounterStore::new();
    store.increment_or_create("OTHER", 1);

    let report = stub_reader(&[]).decode(&page, &store, &mut NoopAnnotator);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("OTHER").unwrap().value, 1);
    assert_eq!(report.blank_rows, ROW_COUNT);
}

#[test]
fn test_empty_key_is_skipped() {
    let mut page = blank_page();
    mark_count(&mut page, 0, Some(1), Some(1));
    let store = CounterStore::new();

    let report = stub_reader(&[(0, "")]).decode(&page, &store, &mut NoopAnnotator);

    assert!(store.is_empty());
    assert_eq!(report.blank_rows, ROW_COUNT);
}

#[test]
fn test_zero_count_leaves_store_unchanged() {
    let page = blank_page();
    let store = CounterStore::new();
    let rows: Vec<(usize, &str)> = (0..ROW_COUNT).map(|r| (r, "WIDGET-1")).collect();

    let report = stub_reader(&rows).decode(&page, &store, &mut NoopAnnotator);

    assert!(store.get("WIDGET-1").is_none());
    assert_eq!(report.unmarked_rows, ROW_COUNT);
    assert_eq!(report.rows_applied(), 0);
}

#[test]
fn test_blank_form_leaves_store_unchanged() {
    let page = blank_page();
    let store = CounterStore::new();
    store.increment_or_create("A", 3);
    store.rename("A", "Apple");
    let before = store.snapshot();

    let report = decode_document(&page, &store);

    assert_eq!(store.snapshot(), before);
    assert_eq!(report.blank_rows, ROW_COUNT);
    assert_eq!(report.failed_rows, 0);
}

#[test]
fn test_rename_survives_decode() {
    let mut page = blank_page();
    mark_count(&mut page, 0, None, Some(3));
    let store = CounterStore::new();
    store.increment_or_create("WIDGET-1", 8);
    store.rename("WIDGET-1", "Blue Widget");

    stub_reader(&[(0, "WIDGET-1")]).decode(&page, &store, &mut NoopAnnotator);

    let entry = store.get("WIDGET-1").unwrap();
    assert_eq!(entry.display_name, "Blue Widget");
    assert_eq!(entry.value, 11);
}

#[test]
fn test_small_scan_skips_rows_without_panicking() {
    let page = RgbImage::from_pixel(1000, 1000, WHITE);
    let store = CounterStore::new();
    let rows: Vec<(usize, &str)> = (0..ROW_COUNT).map(|r| (r, "K")).collect();

    let report = stub_reader(&rows).decode(&page, &store, &mut NoopAnnotator);

    assert!(store.is_empty());
    assert_eq!(report.failed_rows, ROW_COUNT);
}

#[test]
fn test_overlay_does_not_change_results() {
    let mut page = blank_page();
    mark_count(&mut page, 0, Some(3), Some(1));
    mark_count(&mut page, 1, Some(0), Some(9));
    let reader = stub_reader(&[(0, "A"), (1, "B")]);

    let plain = CounterStore::new();
    let plain_report = reader.decode(&page, &plain, &mut NoopAnnotator);

    let annotated = CounterStore::new();
    let mut overlay = OverlayAnnotator::new(&page);
    let annotated_report = reader.decode(&page, &annotated, &mut overlay);

    assert_eq!(plain.snapshot(), annotated.snapshot());
    assert_eq!(plain_report, annotated_report);
    // every row reports its key square; rows with a key also report both groups
    assert_eq!(overlay.labels().len(), ROW_COUNT + 4);
    assert_ne!(overlay.image(), &page);
}

#[test]
fn test_unreadable_path_is_fatal() {
    let store = CounterStore::new();
    let err = decode_document_path("no/such/scan.png", &store).unwrap_err();
    assert!(matches!(err, FormError::ImageLoad { .. }));
    assert!(store.is_empty());
}

/// Paint a QR symbol for `payload` with its top-left quiet-zone corner at (x, y)
fn paint_qr(img: &mut RgbImage, x: u32, y: u32, payload: &str, module_px: u32) {
    paint_qr_in(img, x, y, payload, module_px, Rgb([0, 0, 0]));
}

fn paint_qr_in(img: &mut RgbImage, x: u32, y: u32, payload: &str, module_px: u32, ink: Rgb<u8>) {
    let code = QrCode::new(payload.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let quiet = 4 * module_px;
    for my in 0..modules {
        for mx in 0..modules {
            if colors[(my * modules + mx) as usize] != Color::Dark {
                continue;
            }
            let cell = Region::at(
                x + quiet + mx * module_px,
                y + quiet + my * module_px,
                module_px,
                module_px,
            );
            fill(img, cell, ink);
        }
    }
}

/// Two-row layout with roomy key squares so symbols render at 4px per module
fn roomy_layout() -> FormLayout {
    FormLayout {
        rows: 2,
        pitch: 200.0,
        key: Region::new(10, 10, 150, 150),
        tens: Region::new(170, 60, 470, 90),
        ones_x: 500,
    }
}

#[test]
fn test_real_qr_rows() {
    let layout = roomy_layout();
    let mut page = RgbImage::from_pixel(820, 420, Rgb([255, 255, 255]));
    let row0 = layout.row_regions(0);
    paint_qr(&mut page, row0.key.x0, row0.key.y0, "WIDGET-1", 4);
    mark_digit(&mut page, row0.tens, 4);
    mark_digit(&mut page, row0.ones, 2);
    // row 1 has marks but no symbol
    let row1 = layout.row_regions(1);
    mark_digit(&mut page, row1.ones, 6);

    let store = CounterStore::new();
    let reader = FormReader::new()
        .with_config(ReaderConfig::default())
        .with_layout(layout);
    let report = reader.decode(&page, &store, &mut NoopAnnotator);

    assert_eq!(store.get("WIDGET-1").unwrap().value, 42);
    assert_eq!(store.len(), 1);
    assert_eq!(report.rows_applied(), 1);
    assert_eq!(report.blank_rows, 1);
}

#[test]
fn test_faint_printed_key_is_read() {
    let layout = roomy_layout();
    let mut page = RgbImage::from_pixel(820, 420, WHITE);
    let row0 = layout.row_regions(0);
    // toner-starved key: nothing in the square is darker than mid-grey
    paint_qr_in(&mut page, row0.key.x0, row0.key.y0, "WIDGET-1", 4, Rgb([150, 150, 150]));
    mark_digit(&mut page, row0.tens, 1);
    mark_digit(&mut page, row0.ones, 3);

    let store = CounterStore::new();
    let report = FormReader::new()
        .with_config(ReaderConfig::default())
        .with_layout(layout)
        .decode(&page, &store, &mut NoopAnnotator);

    assert_eq!(store.get("WIDGET-1").unwrap().value, 13);
    assert_eq!(report.rows_applied(), 1);
}

#[test]
fn test_oversized_pitch_fails_rows_without_panicking() {
    let layout = FormLayout {
        rows: 3,
        pitch: 1.0e12,
        ..FormLayout::default()
    };
    let store = CounterStore::new();
    let report = FormReader::new()
        .with_config(ReaderConfig::default())
        .with_layout(layout)
        .decode(&blank_page(), &store, &mut NoopAnnotator);

    assert!(store.is_empty());
    // row 0 sits on the page and is blank; later rows land past its bottom edge
    assert_eq!(report.blank_rows, 1);
    assert_eq!(report.failed_rows, 2);
}

#[test]
fn test_decode_document_path_round_trip() {
    let layout = roomy_layout();
    let mut page = RgbImage::from_pixel(820, 420, Rgb([255, 255, 255]));
    let row0 = layout.row_regions(0);
    paint_qr(&mut page, row0.key.x0, row0.key.y0, "GADGET-7", 4);
    mark_digit(&mut page, row0.ones, 7);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    page.save(&path).unwrap();

    let store = CounterStore::new();
    let image = bubble_tally::tools::load_rgb(&path).unwrap();
    FormReader::new()
        .with_config(ReaderConfig::default())
        .with_layout(layout)
        .decode(&image, &store, &mut NoopAnnotator);
    assert_eq!(store.get("GADGET-7").unwrap().value, 7);

    // the standard layout does not fit this scan: every row is skipped
    let report = decode_document_path(&path, &store).unwrap();
    assert_eq!(report.rows_applied(), 0);
    assert_eq!(store.get("GADGET-7").unwrap().value, 7);
}
