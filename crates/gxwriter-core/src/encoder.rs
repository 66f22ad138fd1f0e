//! Run-length preview encoder
//!
//! Converts a pixel window into the firmware's `M4010` preview commands:
//!
//! ```text
//! M4010 X60 Y60
//! M4010 I0 T57 'ffdfffff0039...'
//! M4010 I57 T112 '...'
//! ```
//!
//! Colors are RGB565 with bit 5 (the low green bit) cleared. A token with
//! that bit set is a run: the following word, tagged `0x3000`, holds the
//! repeat count.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::{EncodeError, EncodeResult};
use crate::pixels::{scale_dimension, PixelBuffer, Window};

/// Longest window edge the firmware accepts before the image is scaled down.
pub const MAX_PREVIEW_EDGE: u32 = 320;

/// Bit flagging a color word as the start of a run.
pub const RUN_MARKER: u16 = 0x20;

/// Longest run a single descriptor can hold.
pub const MAX_RUN_LENGTH: u16 = 4095;

/// Tag carried by the run-length word.
const RUN_LENGTH_TAG: u16 = 0x3000;

/// Hex characters accumulated before a command line is emitted.
const CHUNK_HEX_LEN: usize = 180;

/// One unit of the compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunToken {
    /// A lone pixel.
    Pixel(u16),
    /// `length` repetitions of `color`, with `2 <= length <= 4095`.
    Run { color: u16, length: u16 },
}

impl RunToken {
    fn pending(color: u16, count: u16) -> Self {
        if count >= 2 {
            RunToken::Run {
                color,
                length: count,
            }
        } else {
            RunToken::Pixel(color)
        }
    }

    /// Number of pixels this token expands to.
    pub fn pixel_count(&self) -> usize {
        match self {
            RunToken::Pixel(_) => 1,
            RunToken::Run { length, .. } => *length as usize,
        }
    }

    fn write_hex(&self, out: &mut String) {
        match self {
            RunToken::Pixel(color) => out.push_str(&format!("{:04x}", color)),
            RunToken::Run { color, length } => {
                out.push_str(&format!("{:04x}", color | RUN_MARKER));
                out.push_str(&format!("{:04x}", RUN_LENGTH_TAG | length));
            }
        }
    }
}

/// Reduce an ARGB sample to the firmware's 16-bit color.
///
/// Fully transparent pixels become white.
pub fn pack_rgb565(argb: u32) -> u16 {
    let (r, g, b) = if argb >> 24 & 0xFF == 0 {
        (255, 255, 255)
    } else {
        (argb >> 16 & 0xFF, argb >> 8 & 0xFF, argb & 0xFF)
    };
    ((r >> 3 << 11 | g >> 2 << 5 | b >> 3) as u16) & !RUN_MARKER
}

/// Single left-to-right pass with one pixel of lookback.
pub fn compress(colors: &[u16]) -> Vec<RunToken> {
    let mut tokens = Vec::new();
    let mut iter = colors.iter().copied();
    let Some(mut last) = iter.next() else {
        return tokens;
    };
    let mut same = 1u16;

    for color in iter {
        if color == last && same < MAX_RUN_LENGTH {
            same += 1;
            continue;
        }
        tokens.push(RunToken::pending(last, same));
        last = color;
        same = 1;
    }
    tokens.push(RunToken::pending(last, same));
    tokens
}

/// Accumulates hex tokens and cuts them into `M4010 I.. T..` lines.
#[derive(Debug, Default)]
struct ChunkWriter {
    out: String,
    chunk: String,
    chunk_pixels: usize,
    offset: usize,
}

impl ChunkWriter {
    fn push(&mut self, token: RunToken) {
        token.write_hex(&mut self.chunk);
        self.chunk_pixels += token.pixel_count();
        if self.chunk.len() >= CHUNK_HEX_LEN {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.chunk.is_empty() {
            return;
        }
        self.out.push_str(&format!(
            "M4010 I{} T{} '{}'\n",
            self.offset, self.chunk_pixels, self.chunk
        ));
        self.offset += self.chunk_pixels;
        self.chunk_pixels = 0;
        self.chunk.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

/// Encoder for the firmware's run-length preview commands.
#[derive(Debug, Clone, Copy)]
pub struct PixelRunEncoder {
    max_edge: u32,
}

impl Default for PixelRunEncoder {
    fn default() -> Self {
        Self {
            max_edge: MAX_PREVIEW_EDGE,
        }
    }
}

impl PixelRunEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `window` of `buffer` as `M4010` command text.
    ///
    /// The window end is clipped to the buffer. Windows whose longer edge
    /// exceeds 320 pixels are scaled down, along with the buffer, before
    /// sampling.
    ///
    /// # Errors
    /// Returns `EncodeError::InvalidWindow` if the window start lies beyond
    /// its clipped end.
    pub fn encode(&self, buffer: &PixelBuffer, window: Window) -> EncodeResult<String> {
        let PreviewPixels {
            width,
            height,
            colors,
        } = self.sample(buffer, window)?;

        let tokens = compress(&colors);
        tracing::debug!(
            width,
            height,
            pixels = colors.len(),
            tokens = tokens.len(),
            "Encoded preview window"
        );

        let mut writer = ChunkWriter::default();
        writer.out.push_str(&format!("M4010 X{} Y{}\n", width, height));
        for token in tokens {
            writer.push(token);
        }
        Ok(writer.finish())
    }

    /// Packed colors of `window` exactly as [`encode`](Self::encode) emits
    /// them, after clipping and scaling.
    ///
    /// # Errors
    /// Same as [`encode`](Self::encode).
    pub fn sample(&self, buffer: &PixelBuffer, window: Window) -> EncodeResult<PreviewPixels> {
        let (buffer, window) = self.prepare(buffer, window)?;
        let mut colors = Vec::with_capacity(window.width() as usize * window.height() as usize);
        for y in window.start_y..window.end_y {
            for x in window.start_x..window.end_x {
                colors.push(pack_rgb565(buffer.pixel(x, y)));
            }
        }
        Ok(PreviewPixels {
            width: window.width(),
            height: window.height(),
            colors,
        })
    }

    /// Clamp and, when oversized, rescale the buffer and window.
    fn prepare<'a>(
        &self,
        buffer: &'a PixelBuffer,
        window: Window,
    ) -> EncodeResult<(Cow<'a, PixelBuffer>, Window)> {
        let window = window.clamped(buffer.width(), buffer.height());
        if window.start_x > window.end_x || window.start_y > window.end_y {
            return Err(EncodeError::InvalidWindow {
                start_x: window.start_x,
                start_y: window.start_y,
                end_x: window.end_x,
                end_y: window.end_y,
            });
        }

        let max_edge = window.width().max(window.height());
        if max_edge <= self.max_edge {
            return Ok((Cow::Borrowed(buffer), window));
        }

        let scale = self.max_edge as f64 / max_edge as f64;
        let width = scale_dimension(buffer.width(), scale);
        let height = scale_dimension(buffer.height(), scale);
        tracing::debug!(scale, width, height, "Scaling oversized preview");
        Ok((Cow::Owned(buffer.scaled(width, height)), window.scaled(scale)))
    }
}

/// Dimensions and row-major packed colors of a preview window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPixels {
    pub width: u32,
    pub height: u32,
    /// Packed colors in row-major order, run marker cleared.
    pub colors: Vec<u16>,
}

fn size_regex() -> &'static Regex {
    static SIZE_REGEX: OnceLock<Regex> = OnceLock::new();
    SIZE_REGEX.get_or_init(|| Regex::new(r"^M4010 X(\d+) Y(\d+)$").expect("invalid regex pattern"))
}

fn data_regex() -> &'static Regex {
    static DATA_REGEX: OnceLock<Regex> = OnceLock::new();
    DATA_REGEX.get_or_init(|| {
        Regex::new(r"^M4010 I(\d+) T(\d+) '([0-9a-f]*)'$").expect("invalid regex pattern")
    })
}

/// Decode `M4010` preview commands back into packed colors.
///
/// Every data line is checked against the running pixel offset and its
/// declared pixel count.
pub fn decode_pixel_commands(text: &str) -> EncodeResult<PreviewPixels> {
    let malformed = |line_number: usize, reason: &str| EncodeError::MalformedCommand {
        line_number,
        reason: reason.to_string(),
    };

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .filter(|(_, line)| !line.is_empty());

    let (first_number, first) = lines
        .next()
        .ok_or_else(|| malformed(1, "missing size command"))?;
    let size = size_regex()
        .captures(first)
        .ok_or_else(|| malformed(first_number, "expected M4010 X<w> Y<h>"))?;
    let width = size[1]
        .parse()
        .map_err(|_| malformed(first_number, "width out of range"))?;
    let height = size[2]
        .parse()
        .map_err(|_| malformed(first_number, "height out of range"))?;

    let mut colors = Vec::new();
    for (line_number, line) in lines {
        let caps = data_regex()
            .captures(line)
            .ok_or_else(|| malformed(line_number, "expected M4010 I<offset> T<count> '<hex>'"))?;
        let offset: usize = caps[1]
            .parse()
            .map_err(|_| malformed(line_number, "offset out of range"))?;
        let count: usize = caps[2]
            .parse()
            .map_err(|_| malformed(line_number, "count out of range"))?;
        let hex = &caps[3];

        if offset != colors.len() {
            return Err(malformed(line_number, "offset does not match pixels so far"));
        }
        if hex.len() % 4 != 0 {
            return Err(malformed(line_number, "payload is not a whole number of words"));
        }

        let mut words = hex
            .as_bytes()
            .chunks(4)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|s| u16::from_str_radix(s, 16).ok())
            });
        let before = colors.len();
        while let Some(word) = words.next() {
            let word = word.ok_or_else(|| malformed(line_number, "bad hex word"))?;
            if word & RUN_MARKER == 0 {
                colors.push(word);
                continue;
            }
            let length = words
                .next()
                .flatten()
                .ok_or_else(|| malformed(line_number, "run marker without length"))?;
            if length & 0xF000 != RUN_LENGTH_TAG {
                return Err(malformed(line_number, "run length word missing 0x3000 tag"));
            }
            let length = (length & 0x0FFF) as usize;
            colors.extend(std::iter::repeat(word & !RUN_MARKER).take(length));
        }

        if colors.len() - before != count {
            return Err(malformed(line_number, "declared count does not match payload"));
        }
    }

    Ok(PreviewPixels {
        width,
        height,
        colors,
    })
}
