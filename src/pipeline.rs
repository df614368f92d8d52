use std::path::Path;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::annotate::{Annotator, NoopAnnotator};
use crate::config::ReaderConfig;
use crate::decoder::{KeyReader, QrKeyReader};
use crate::detector::analyze_sections;
use crate::error::{FormError, FormResult};
use crate::layout::FormLayout;
use crate::models::Region;
use crate::store::CounterStore;
use crate::tools::load_rgb;
use crate::utils::LumaPlane;

/// A row whose count was applied to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// Row index on the form
    pub row: usize,
    /// Decoded key
    pub key: String,
    /// Tens digit read from the bubbles
    pub tens: usize,
    /// Ones digit read from the bubbles
    pub ones: usize,
    /// Delta applied, `tens * 10 + ones`
    pub count: i64,
    /// Entry value after the update
    pub total: i64,
}

/// What one decode call did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Rows applied to the store, in row order
    pub applied: Vec<RowOutcome>,
    /// Rows without a readable key
    pub blank_rows: usize,
    /// Rows with a key but a zero count
    pub unmarked_rows: usize,
    /// Rows skipped because a region was invalid or outside the scan
    pub failed_rows: usize,
}

impl DecodeReport {
    /// Number of rows that changed the store
    pub fn rows_applied(&self) -> usize {
        self.applied.len()
    }
}

/// Decodes tally forms into a [`CounterStore`]
#[derive(Debug, Clone)]
pub struct FormReader<K = QrKeyReader> {
    layout: FormLayout,
    config: ReaderConfig,
    keys: K,
}

impl FormReader {
    /// Standard layout, thresholds from the environment, QR keys
    pub fn new() -> Self {
        Self {
            layout: FormLayout::default(),
            config: ReaderConfig::from_env(),
            keys: QrKeyReader,
        }
    }
}

impl Default for FormReader {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KeyReader> FormReader<K> {
    /// Replace the key source
    pub fn with_key_reader<R: KeyReader>(self, keys: R) -> FormReader<R> {
        FormReader {
            layout: self.layout,
            config: self.config,
            keys,
        }
    }

    /// Replace the row geometry
    pub fn with_layout(mut self, layout: FormLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the thresholds
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Row geometry in use
    pub fn layout(&self) -> &FormLayout {
        &self.layout
    }

    /// Thresholds in use
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Decode every row of `image` and apply non-zero counts to `store`.
    ///
    /// Rows are independent: a row that cannot be read is logged and skipped.
    pub fn decode(
        &self,
        image: &RgbImage,
        store: &CounterStore,
        annotator: &mut dyn Annotator,
    ) -> DecodeReport {
        let luma = LumaPlane::from_rgb(image);
        self.decode_luma(&luma, store, annotator)
    }

    /// Same as [`FormReader::decode`] on an already converted scan
    pub fn decode_luma(
        &self,
        luma: &LumaPlane,
        store: &CounterStore,
        annotator: &mut dyn Annotator,
    ) -> DecodeReport {
        if !self.layout.fits(luma.width(), luma.height()) {
            warn!(
                width = luma.width(),
                height = luma.height(),
                "form layout exceeds the scan; rows outside it will be skipped"
            );
        }

        let mut report = DecodeReport::default();
        for row in 0..self.layout.rows {
            match self.decode_row(row, luma, store, annotator) {
                Ok(Some(outcome)) => report.applied.push(outcome),
                Ok(None) => report.unmarked_rows += 1,
                Err(e @ (FormError::RegionDecode(_) | FormError::EmptyKey)) => {
                    debug!(row, error = %e, "no key, skipping row");
                    report.blank_rows += 1;
                }
                Err(e) => {
                    warn!(row, error = %e, "skipping row");
                    report.failed_rows += 1;
                }
            }
        }

        info!(
            applied = report.rows_applied(),
            blank = report.blank_rows,
            unmarked = report.unmarked_rows,
            failed = report.failed_rows,
            "form decoded"
        );
        report
    }

    fn decode_row(
        &self,
        row: usize,
        luma: &LumaPlane,
        store: &CounterStore,
        annotator: &mut dyn Annotator,
    ) -> FormResult<Option<RowOutcome>> {
        let regions = self.layout.row_regions(row);

        let key = match self.keys.read_key(luma, regions.key) {
            Ok(key) => {
                annotator.key_region(regions.key, &key);
                key
            }
            Err(e) => {
                annotator.key_region(regions.key, "");
                return Err(e);
            }
        };
        if key.is_empty() {
            return Err(FormError::EmptyKey);
        }

        let tens = self.read_digit(luma, regions.tens, annotator)?;
        let ones = self.read_digit(luma, regions.ones, annotator)?;
        let count = (tens * 10 + ones) as i64;
        if count == 0 {
            debug!(row, key = %key, "no marks, leaving tally untouched");
            return Ok(None);
        }

        let entry = store.increment_or_create(&key, count);
        info!(
            row,
            key = %key,
            name = %entry.display_name,
            total = entry.value,
            added = count,
            "updated tally"
        );
        Ok(Some(RowOutcome {
            row,
            key,
            tens,
            ones,
            count,
            total: entry.value,
        }))
    }

    fn read_digit(
        &self,
        luma: &LumaPlane,
        region: Region,
        annotator: &mut dyn Annotator,
    ) -> FormResult<usize> {
        let reading = analyze_sections(luma, region, self.config.digit_sections, &self.config)?;
        annotator.section_region(region, &reading);
        Ok(reading.standout())
    }
}

/// Decode `image` with the standard reader, without an overlay
pub fn decode_document(image: &RgbImage, store: &CounterStore) -> DecodeReport {
    FormReader::new().decode(image, store, &mut NoopAnnotator)
}

/// Load the scan at `path` and decode it.
///
/// A scan that cannot be loaded is an error and leaves `store` untouched.
pub fn decode_document_path<P: AsRef<Path>>(
    path: P,
    store: &CounterStore,
) -> FormResult<DecodeReport> {
    let image = load_rgb(path)?;
    Ok(decode_document(&image, store))
}
