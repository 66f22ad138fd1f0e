//! # GXWriter Core
//!
//! Builds GX (`xgcode 1.0`) containers from slicer G-code:
//!
//! - **metadata** - scans `;TIME:`, `;Filament used:` and `;Layer height:` comments
//! - **encoder** - run-length `M4010` preview commands from a pixel buffer
//! - **header** - the fixed binary header and byte layout of the container
//! - **assembler** - orchestration and plain-text fallback
//! - **mime** - the `application/xgcode` file type

pub mod assembler;
pub mod encoder;
pub mod error;
pub mod header;
pub mod metadata;
pub mod mime;
pub mod pixels;

pub use assembler::{
    no_preview, Assembly, ContainerAssembler, Conversion, OutputMode, PreviewOptions,
    PreviewRenderer, TextGenerator, WriteReport,
};
pub use encoder::{
    compress, decode_pixel_commands, pack_rgb565, PixelRunEncoder, PreviewPixels, RunToken,
    MAX_PREVIEW_EDGE, MAX_RUN_LENGTH, RUN_MARKER,
};
pub use error::{
    EncodeError, EncodeResult, GxError, HeaderError, HeaderResult, MetadataError, MetadataResult,
    Result,
};
pub use header::{
    encode_latin1, encode_latin1_lossy, BitmapBlock, ContainerHeader, HeaderBuilder,
    HeaderConstants, BITMAP_LEN, HEADER_LEN, MAGIC, PAYLOAD_OFFSET,
};
pub use metadata::{MetadataScanner, PrintMetadata};
pub use mime::{MimeRegistry, MimeType, GX_MIME_NAME, GX_SUFFIX};
pub use pixels::{PixelBuffer, Window};
