//! Error types for the GX container pipeline.
//!
//! Each stage of a conversion has its own error enum. `GxError` is the
//! caller-facing taxonomy: only `UpstreamGeneration` and `UnsupportedMode`
//! ever abort a write, everything else degrades to the plain-text fallback.

use std::io;
use thiserror::Error;

use crate::assembler::OutputMode;

/// Errors raised while scanning slicer comments for print statistics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// The `;Filament used:` value is not a decimal number.
    #[error("Unparseable filament usage in line {line:?}")]
    InvalidFilament {
        /// The offending line.
        line: String,
    },

    /// A parsed value was NaN or infinite and cannot be truncated.
    #[error("Non-finite value for {field}: {value}")]
    NonFinite {
        /// The metadata field being populated.
        field: &'static str,
        /// The parsed value.
        value: f64,
    },
}

/// Errors raised by the run-length pixel encoder and decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The window start lies beyond its (clamped) end.
    #[error("Invalid window: start ({start_x}, {start_y}) beyond end ({end_x}, {end_y})")]
    InvalidWindow {
        start_x: u32,
        start_y: u32,
        end_x: u32,
        end_y: u32,
    },

    /// A pixel buffer whose sample count does not match its dimensions.
    #[error("Pixel buffer of {width}x{height} holds {actual} samples")]
    BufferSize {
        width: u32,
        height: u32,
        actual: usize,
    },

    /// Command text that does not follow the `M4010` pixel grammar.
    #[error("Malformed pixel command at line {line_number}: {reason}")]
    MalformedCommand {
        /// One-based line number in the command text.
        line_number: usize,
        /// What was wrong with the line.
        reason: String,
    },
}

/// Errors raised while laying out or reading the binary header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// A value does not fit the fixed width of its header slot.
    #[error("Header field '{field}' value {value} does not fit in {width} bytes")]
    FieldOverflow {
        field: &'static str,
        value: i64,
        width: usize,
    },

    /// The payload contains a character outside the single-byte range.
    #[error("Character {ch:?} at offset {offset} cannot be encoded as a single byte")]
    Unencodable { ch: char, offset: usize },

    /// Container bytes shorter than the fixed header.
    #[error("Container truncated: {actual} bytes, header needs {expected}")]
    Truncated { expected: usize, actual: usize },

    /// Container bytes that do not start with the xgcode magic.
    #[error("Not a GX container: bad magic")]
    BadMagic,
}

/// Top-level conversion error.
#[derive(Error, Debug)]
pub enum GxError {
    /// The slicer text generator failed; its diagnostic is passed through unchanged.
    #[error("{0}")]
    UpstreamGeneration(String),

    /// The caller asked for an output mode the container writer cannot produce.
    #[error("GXWriter does not support {0} output mode")]
    UnsupportedMode(OutputMode),

    /// The preview renderer failed.
    #[error("Preview rendering failed: {0}")]
    Render(String),

    /// Metadata scanning failed.
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Pixel encoding failed.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Header assembly failed.
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GxError {
    /// Whether the error is a conversion failure that the assembler recovers from
    /// by emitting the plain-text fallback.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            GxError::Metadata(_) | GxError::Encode(_) | GxError::Header(_)
        )
    }
}

/// Result type alias for metadata scanning.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Result type alias for pixel encoding.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Result type alias for header operations.
pub type HeaderResult<T> = std::result::Result<T, HeaderError>;

/// Result type alias for conversions.
pub type Result<T> = std::result::Result<T, GxError>;
