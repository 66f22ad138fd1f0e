//! Print statistics scanner
//!
//! Slicers annotate the G-code they produce with comment lines such as
//! `;TIME:6245`, `;Filament used: 2.41m` and `;Layer height: 0.2`. The
//! scanner walks the text once, line by line, and keeps the last value seen
//! for each marker.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{MetadataError, MetadataResult};

/// Marker for the estimated print time in seconds.
pub const TIME_MARKER: &str = ";TIME:";

/// Marker for the filament length in meters.
pub const FILAMENT_MARKER: &str = ";Filament used:";

/// Marker for the layer height in millimeters.
pub const LAYER_HEIGHT_MARKER: &str = ";Layer height:";

/// Print statistics extracted from slicer comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintMetadata {
    /// Estimated print time in whole seconds.
    pub print_time_seconds: i64,
    /// Filament length in centimeters (meters × 100, truncated).
    pub filament_usage_centimeters: i64,
    /// Layer height in microns (millimeters × 1000, truncated).
    pub layer_height_microns: i64,
}

/// Line-oriented scanner for slicer comment markers.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataScanner;

impl MetadataScanner {
    /// Create a new scanner
    pub fn new() -> Self {
        Self
    }

    /// Scan the full instruction stream.
    ///
    /// Lines that match no marker are ignored. When a marker appears on more
    /// than one line, the last one wins.
    ///
    /// # Errors
    /// Returns `MetadataError::InvalidFilament` when a `;Filament used:` line
    /// does not carry a decimal number.
    pub fn scan(&self, gcode: &str) -> MetadataResult<PrintMetadata> {
        let mut metadata = PrintMetadata::default();

        for line in gcode.split('\n') {
            if let Some(rest) = line.strip_prefix(TIME_MARKER) {
                let seconds = leading_number(rest).unwrap_or(0.0);
                metadata.print_time_seconds = truncate("print_time", seconds)?;
            } else if let Some(rest) = line.strip_prefix(FILAMENT_MARKER) {
                metadata.filament_usage_centimeters = parse_filament(line, rest)?;
            } else if let Some(rest) = line.strip_prefix(LAYER_HEIGHT_MARKER) {
                let millimeters = leading_number(rest).unwrap_or(0.0);
                metadata.layer_height_microns = truncate("layer_height", millimeters * 1000.0)?;
            }
        }

        tracing::debug!(
            print_time = metadata.print_time_seconds,
            filament_cm = metadata.filament_usage_centimeters,
            layer_height_um = metadata.layer_height_microns,
            "Scanned print metadata"
        );

        Ok(metadata)
    }
}

fn number_regex() -> &'static Regex {
    static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    NUMBER_REGEX.get_or_init(|| Regex::new(r"^-?[0-9]+\.?[0-9]*").expect("invalid regex pattern"))
}

/// Parse the number anchored at the start of `rest`, if any.
fn leading_number(rest: &str) -> Option<f64> {
    let token = number_regex().find(rest)?.as_str();
    // "12." is a valid match; drop the dangling point before parsing
    token.trim_end_matches('.').parse().ok()
}

/// The filament value is the text between the marker colon and the next
/// `m` (or the next colon, whichever comes first).
fn parse_filament(line: &str, rest: &str) -> MetadataResult<i64> {
    let field = rest.split(':').next().unwrap_or_default();
    let number = field.split('m').next().unwrap_or_default().trim();
    let meters: f64 = number
        .parse()
        .map_err(|_| MetadataError::InvalidFilament {
            line: line.to_string(),
        })?;
    truncate("filament_usage", meters * 100.0)
}

fn truncate(field: &'static str, value: f64) -> MetadataResult<i64> {
    if !value.is_finite() {
        return Err(MetadataError::NonFinite { field, value });
    }
    Ok(value.trunc() as i64)
}
