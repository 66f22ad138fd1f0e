//! Preview command - print the M4010 commands for an image

use anyhow::{bail, Result};
use clap::Args;
use gxwriter_core::{decode_pixel_commands, PixelRunEncoder, Window};
use std::path::PathBuf;

use super::parse_window;
use crate::sources::ImagePreviewRenderer;

/// Arguments for the preview command
#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Image to encode
    pub image: PathBuf,

    /// Region to encode as x0,y0,x1,y1 (defaults to the whole image)
    #[arg(short, long, value_parser = parse_window)]
    pub window: Option<Window>,

    /// Decode the result again and check it against the image
    #[arg(long)]
    pub verify: bool,
}

/// Execute the preview command, returning the command text
pub fn execute(args: PreviewArgs) -> Result<String> {
    let buffer = ImagePreviewRenderer::new(&args.image).load()?;
    let window = args
        .window
        .unwrap_or_else(|| Window::full(buffer.width(), buffer.height()));
    let encoder = PixelRunEncoder::new();
    let commands = encoder.encode(&buffer, window)?;

    if args.verify {
        let decoded = decode_pixel_commands(&commands)?;
        let sampled = encoder.sample(&buffer, window)?;
        if decoded.width != sampled.width || decoded.height != sampled.height {
            bail!(
                "Decoded a {}x{} preview, expected {}x{}",
                decoded.width,
                decoded.height,
                sampled.width,
                sampled.height
            );
        }
        if let Some(index) = decoded
            .colors
            .iter()
            .zip(&sampled.colors)
            .position(|(got, want)| got != want)
        {
            bail!(
                "Decoded color {:04x} at pixel {} differs from sampled {:04x}",
                decoded.colors[index],
                index,
                sampled.colors[index]
            );
        }
        if decoded.colors.len() != sampled.colors.len() {
            bail!(
                "Decoded {} pixels, expected {}",
                decoded.colors.len(),
                sampled.colors.len()
            );
        }
        tracing::info!(pixels = sampled.colors.len(), "Preview commands verified");
    }

    Ok(commands)
}
