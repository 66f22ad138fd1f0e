//! File-backed collaborators for the command line.
//!
//! Inside a slicer these come from the host: the G-code writer and the
//! scene snapshot. Here the G-code is read from disk and the preview is any
//! image file the `image` crate can open.

use anyhow::Context;
use gxwriter_core::{PixelBuffer, PreviewRenderer, TextGenerator};
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Supplies G-code from a file.
///
/// UTF-8 files are read as such; anything else is taken as Latin-1.
#[derive(Debug, Clone)]
pub struct FileTextGenerator {
    path: PathBuf,
}

impl FileTextGenerator {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TextGenerator for FileTextGenerator {
    fn generate(&mut self, sink: &mut String) -> Result<(), String> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))?;
        match String::from_utf8(bytes) {
            Ok(text) => sink.push_str(&text),
            Err(err) => sink.extend(err.into_bytes().into_iter().map(char::from)),
        }
        Ok(())
    }
}

/// Supplies a preview by scaling an image file to the requested size.
#[derive(Debug, Clone)]
pub struct ImagePreviewRenderer {
    path: PathBuf,
}

impl ImagePreviewRenderer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the image at its native size.
    pub fn load(&self) -> anyhow::Result<PixelBuffer> {
        let image = image::open(&self.path)
            .with_context(|| format!("Failed to load image {}", self.path.display()))?;
        Ok(PixelBuffer::from_rgba_image(&image.to_rgba8()))
    }
}

impl PreviewRenderer for ImagePreviewRenderer {
    fn render(&mut self, width: u32, height: u32) -> anyhow::Result<PixelBuffer> {
        let image = image::open(&self.path)
            .with_context(|| format!("Failed to load image {}", self.path.display()))?;
        let scaled = image.resize_exact(width, height, FilterType::Triangle);
        Ok(PixelBuffer::from_rgba_image(&scaled.to_rgba8()))
    }
}
