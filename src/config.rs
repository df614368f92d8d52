//! Reader thresholds
//!
//! Defaults are the values the printed form was tuned for. Operators can
//! override them through the environment without rebuilding:
//!
//! - `FORM_DARK_THRESHOLD`: luminance below which a pixel counts as ink (0-255)
//! - `FORM_SIGNIFICANCE_FACTOR`: how far above the mean a strip must rise to count as a mark

use crate::layout::DIGIT_SECTIONS;

/// Luminance strictly below this counts as a dark (inked) pixel
pub const DARK_THRESHOLD: u8 = 100;
/// A strip must exceed `(1 + SIGNIFICANCE_FACTOR) * mean` to stand out
pub const SIGNIFICANCE_FACTOR: f64 = 0.5;

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

fn parse_env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

/// Thresholds used by the bubble analyzer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderConfig {
    /// See [`DARK_THRESHOLD`]
    pub dark_threshold: u8,
    /// See [`SIGNIFICANCE_FACTOR`]
    pub significance_factor: f64,
    /// Strips per digit group
    pub digit_sections: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dark_threshold: DARK_THRESHOLD,
            significance_factor: SIGNIFICANCE_FACTOR,
            digit_sections: DIGIT_SECTIONS,
        }
    }
}

impl ReaderConfig {
    /// Defaults overridden by `FORM_*` environment variables; unparsable values are ignored
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dark_threshold: parse_env_u8("FORM_DARK_THRESHOLD", defaults.dark_threshold),
            significance_factor: parse_env_f64(
                "FORM_SIGNIFICANCE_FACTOR",
                defaults.significance_factor,
            ),
            ..defaults
        }
    }
}
