//! Container assembly
//!
//! Drives one conversion: G-code from the text generator, statistics from
//! the scanner, a preview from the renderer, and finally the header. Any
//! failure after the G-code exists degrades to writing the G-code as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::encoder::PixelRunEncoder;
use crate::error::{GxError, Result};
use crate::header::{encode_latin1, encode_latin1_lossy, BitmapBlock, HeaderBuilder, HeaderConstants};
use crate::metadata::{MetadataScanner, PrintMetadata};
use crate::pixels::{PixelBuffer, Window};

/// Output modes a host may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Raw bytes; the only mode the container writer supports.
    Binary,
    /// Text stream.
    Text,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Source of the slicer's G-code.
pub trait TextGenerator {
    /// Append the G-code to `sink`. On failure, return the diagnostic message
    /// to surface to the user.
    fn generate(&mut self, sink: &mut String) -> std::result::Result<(), String>;
}

impl<F> TextGenerator for F
where
    F: FnMut(&mut String) -> std::result::Result<(), String>,
{
    fn generate(&mut self, sink: &mut String) -> std::result::Result<(), String> {
        self(sink)
    }
}

/// Source of the preview bitmap.
///
/// Hosts whose renderer has thread affinity run this on the right thread;
/// the assembler only calls it synchronously.
pub trait PreviewRenderer {
    fn render(&mut self, width: u32, height: u32) -> anyhow::Result<PixelBuffer>;
}

impl<F> PreviewRenderer for F
where
    F: FnMut(u32, u32) -> anyhow::Result<PixelBuffer>,
{
    fn render(&mut self, width: u32, height: u32) -> anyhow::Result<PixelBuffer> {
        self(width, height)
    }
}

/// Renderer for hosts without a scene to render.
pub fn no_preview(_width: u32, _height: u32) -> anyhow::Result<PixelBuffer> {
    Err(anyhow::anyhow!("no preview renderer available"))
}

/// Preview request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    /// Width requested from the renderer
    pub width: u32,
    /// Height requested from the renderer
    pub height: u32,
    /// Region of the rendered image to encode
    pub window: Window,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 60,
            height: 60,
            window: Window::full(60, 60),
        }
    }
}

/// Bytes produced by one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    /// Header, bitmap block and payload.
    Container(Vec<u8>),
    /// The unmodified G-code.
    Fallback(Vec<u8>),
}

impl Assembly {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Assembly::Container(bytes) | Assembly::Fallback(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Assembly::Container(bytes) | Assembly::Fallback(bytes) => bytes,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Assembly::Container(_))
    }
}

/// Result of [`ContainerAssembler::assemble`].
#[derive(Debug, Clone)]
pub struct Conversion {
    pub assembly: Assembly,
    /// Scanned statistics, if scanning succeeded.
    pub metadata: Option<PrintMetadata>,
    /// Encoded `M4010` preview commands, if a preview was rendered.
    ///
    /// Not embedded in the container; the bitmap block stays zero-filled.
    pub preview_commands: Option<String>,
}

/// Summary of a completed write.
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub container: bool,
    pub bytes_written: usize,
    pub metadata: Option<PrintMetadata>,
    pub preview_commands: Option<String>,
}

/// Orchestrates a GX conversion.
#[derive(Debug, Clone, Default)]
pub struct ContainerAssembler {
    scanner: MetadataScanner,
    encoder: PixelRunEncoder,
    builder: HeaderBuilder,
    preview: PreviewOptions,
}

impl ContainerAssembler {
    pub fn new(constants: HeaderConstants, preview: PreviewOptions) -> Self {
        Self {
            scanner: MetadataScanner::new(),
            encoder: PixelRunEncoder::new(),
            builder: HeaderBuilder::new(constants),
            preview,
        }
    }

    /// Run a full conversion and write the result to `out` in one call.
    ///
    /// # Errors
    /// - `GxError::UnsupportedMode` for anything but `OutputMode::Binary`
    /// - `GxError::UpstreamGeneration` when the text generator fails
    /// - `GxError::Io` when the sink rejects the bytes
    ///
    /// Conversion failures are not errors: the G-code is written unchanged.
    pub fn write<W, G, R>(
        &self,
        out: &mut W,
        generator: &mut G,
        renderer: &mut R,
        mode: OutputMode,
    ) -> Result<WriteReport>
    where
        W: Write + ?Sized,
        G: TextGenerator + ?Sized,
        R: PreviewRenderer + ?Sized,
    {
        tracing::info!("Starting GXWriter");
        if mode != OutputMode::Binary {
            tracing::error!(%mode, "GXWriter does not support non-binary mode");
            return Err(GxError::UnsupportedMode(mode));
        }

        let mut gcode = String::new();
        generator
            .generate(&mut gcode)
            .map_err(GxError::UpstreamGeneration)?;

        let conversion = self.assemble(&gcode, renderer);
        let container = conversion.assembly.is_container();
        let bytes = conversion.assembly.into_bytes();
        out.write_all(&bytes)?;
        out.flush()?;

        tracing::info!(bytes = bytes.len(), container, "GXWriter done");
        Ok(WriteReport {
            container,
            bytes_written: bytes.len(),
            metadata: conversion.metadata,
            preview_commands: conversion.preview_commands,
        })
    }

    /// Build the container for `gcode`, or the fallback if any step fails.
    pub fn assemble<R>(&self, gcode: &str, renderer: &mut R) -> Conversion
    where
        R: PreviewRenderer + ?Sized,
    {
        let mut metadata = None;
        let mut preview_commands = None;

        match self.try_assemble(gcode, renderer, &mut metadata, &mut preview_commands) {
            Ok(bytes) => Conversion {
                assembly: Assembly::Container(bytes),
                metadata,
                preview_commands,
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Failed to create gx file, defaulting to write gcode"
                );
                Conversion {
                    assembly: Assembly::Fallback(encode_latin1_lossy(gcode)),
                    metadata,
                    preview_commands,
                }
            }
        }
    }

    fn try_assemble<R>(
        &self,
        gcode: &str,
        renderer: &mut R,
        metadata: &mut Option<PrintMetadata>,
        preview_commands: &mut Option<String>,
    ) -> Result<Vec<u8>>
    where
        R: PreviewRenderer + ?Sized,
    {
        let payload = encode_latin1(gcode)?;
        let scanned = self.scanner.scan(gcode)?;
        *metadata = Some(scanned);

        if let Some(preview) = self.render_preview(renderer) {
            *preview_commands = Some(self.encoder.encode(&preview, self.preview.window)?);
        }

        let bitmap = BitmapBlock::zeroed();
        Ok(self.builder.build(&scanned, &bitmap, &payload)?)
    }

    fn render_preview<R>(&self, renderer: &mut R) -> Option<PixelBuffer>
    where
        R: PreviewRenderer + ?Sized,
    {
        tracing::info!(
            width = self.preview.width,
            height = self.preview.height,
            "Creating thumbnail image"
        );
        match renderer.render(self.preview.width, self.preview.height) {
            Ok(buffer) => Some(buffer),
            Err(err) => {
                let err = GxError::Render(format!("{:#}", err));
                tracing::warn!(error = %err, "Continuing without preview");
                None
            }
        }
    }
}
