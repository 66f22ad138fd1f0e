//! Convert command - wrap a G-code file in a GX container

use anyhow::{Context, Result};
use clap::Args;
use gxwriter_core::{no_preview, ContainerAssembler, MimeRegistry, OutputMode};
use gxwriter_settings::Config;
use std::path::{Path, PathBuf};

use crate::sources::{FileTextGenerator, ImagePreviewRenderer};

/// Arguments for the convert command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// G-code file produced by the slicer
    pub input: PathBuf,

    /// Output file (defaults to the input with the configured suffix)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image used as the preview snapshot
    #[arg(short, long)]
    pub preview: Option<PathBuf>,

    /// Where to write the encoded M4010 preview commands
    #[arg(long)]
    pub preview_out: Option<PathBuf>,

    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Request text output mode (not supported by the GX format)
    #[arg(long)]
    pub text_mode: bool,
}

/// What a conversion produced
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub output: PathBuf,
    pub container: bool,
    pub bytes_written: usize,
    pub preview_commands: Option<PathBuf>,
}

/// Execute the convert command
pub fn execute(args: ConvertArgs, registry: &MimeRegistry) -> Result<ConvertOutcome> {
    let config = Config::load_or_default(args.config.as_deref()).context("Failed to load config")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(&config.output.suffix));

    if let Some(mime) = registry.by_suffix(&config.output.suffix) {
        tracing::debug!(mime = %mime.name, "Output file type");
    }

    let assembler = ContainerAssembler::new(config.header, config.preview.options());
    let mode = if args.text_mode {
        OutputMode::Text
    } else {
        OutputMode::Binary
    };

    let mut generator = FileTextGenerator::new(&args.input);
    let mut bytes = Vec::new();
    let report = match &args.preview {
        Some(image) => assembler.write(
            &mut bytes,
            &mut generator,
            &mut ImagePreviewRenderer::new(image),
            mode,
        ),
        None => assembler.write(&mut bytes, &mut generator, &mut no_preview, mode),
    }?;

    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let preview_path = args.preview_out.clone().or_else(|| {
        config
            .preview
            .write_commands
            .then(|| preview_sidecar(&output))
    });
    let preview_commands = match (preview_path, &report.preview_commands) {
        (Some(path), Some(commands)) => {
            std::fs::write(&path, commands)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(path)
        }
        _ => None,
    };

    Ok(ConvertOutcome {
        output,
        container: report.container,
        bytes_written: report.bytes_written,
        preview_commands,
    })
}

fn preview_sidecar(output: &Path) -> PathBuf {
    output.with_extension("m4010.gcode")
}
