//! # GXWriter
//!
//! Converts slicer G-code into the GX (`xgcode 1.0`) container read by
//! FlashForge-style printer firmware.
//!
//! ## Architecture
//!
//! 1. **gxwriter-core** - metadata scanning, preview encoding, header layout, assembly
//! 2. **gxwriter-settings** - configuration files
//! 3. **gxwriter** - this crate: logging, file-backed sources and the command line

pub mod commands;
pub mod sources;

pub use gxwriter_core::{
    ContainerAssembler, ContainerHeader, GxError, HeaderConstants, MimeRegistry, OutputMode,
    PixelBuffer, PixelRunEncoder, PrintMetadata, Window,
};
pub use gxwriter_settings::Config;
pub use sources::{FileTextGenerator, ImagePreviewRenderer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so command output on stdout stays clean
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
