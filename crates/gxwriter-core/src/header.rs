//! GX container header
//!
//! Fixed little-endian layout read by the printer firmware:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 12 | `"xgcode 1.0\n\0"` |
//! | 0x0C | 4 | reserved |
//! | 0x10 | 4 | bitmap offset |
//! | 0x14 | 4 | G-code offset |
//! | 0x18 | 4 | G-code offset (repeated) |
//! | 0x1C | 4 | print time (s) |
//! | 0x20 | 4 | filament, right extruder |
//! | 0x24 | 4 | filament, left extruder |
//! | 0x28 | 2 | multi-extruder type |
//! | 0x2A | 2 | layer height (µm) |
//! | 0x2C | 2 | reserved |
//! | 0x2E | 2 | perimeter shells |
//! | 0x30 | 2 | print speed (mm/s) |
//! | 0x32 | 2 | platform temperature |
//! | 0x34 | 2 | right extruder temperature |
//! | 0x36 | 2 | left extruder temperature |
//! | 0x38 | 2 | reserved |
//! | 0x3A | 14454 | bitmap block |
//! | 0x38B0 | n | G-code |

use serde::{Deserialize, Serialize};

use crate::error::{HeaderError, HeaderResult};
use crate::metadata::PrintMetadata;

/// Magic and format version at the start of every container.
pub const MAGIC: &[u8; 12] = b"xgcode 1.0\n\0";

/// Size of the fixed fields preceding the bitmap block.
pub const HEADER_LEN: usize = 58;

/// Size of the bitmap block (an 80x60 24-bit BMP).
pub const BITMAP_LEN: usize = 14454;

/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = HEADER_LEN + BITMAP_LEN;

/// Header fields that do not come from the G-code comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConstants {
    /// Extruder configuration code (11 = single right extruder)
    pub multi_extruder_type: u16,
    /// Number of perimeter shells
    pub perimeter_shells: u16,
    /// Print speed in mm/s
    pub print_speed: u16,
    /// Build platform temperature in °C
    pub platform_temperature: u16,
    /// Right extruder temperature in °C
    pub right_extruder_temperature: u16,
    /// Left extruder temperature in °C
    pub left_extruder_temperature: u16,
}

impl Default for HeaderConstants {
    fn default() -> Self {
        Self {
            multi_extruder_type: 11,
            perimeter_shells: 2,
            print_speed: 60,
            platform_temperature: 0,
            right_extruder_temperature: 0,
            left_extruder_temperature: 0,
        }
    }
}

/// The decoded fixed fields of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub bitmap_offset: u32,
    pub payload_offset: u32,
    pub print_time_seconds: i32,
    pub filament_right: i32,
    pub filament_left: i32,
    pub layer_height_microns: i16,
    pub constants: HeaderConstants,
}

impl ContainerHeader {
    /// Lay out a header for the given statistics.
    ///
    /// # Errors
    /// Returns `HeaderError::FieldOverflow` when a statistic does not fit its slot.
    pub fn new(metadata: &PrintMetadata, constants: HeaderConstants) -> HeaderResult<Self> {
        Ok(Self {
            bitmap_offset: HEADER_LEN as u32,
            payload_offset: PAYLOAD_OFFSET as u32,
            print_time_seconds: fit("print_time", metadata.print_time_seconds)?,
            filament_right: fit("filament_usage", metadata.filament_usage_centimeters)?,
            filament_left: 0,
            layer_height_microns: fit("layer_height", metadata.layer_height_microns)?,
            constants,
        })
    }

    /// Serialize the fixed fields.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let c = &self.constants;
        let mut out = [0u8; HEADER_LEN];
        let mut at = 0;
        let mut put = |bytes: &[u8]| {
            out[at..at + bytes.len()].copy_from_slice(bytes);
            at += bytes.len();
        };

        put(&MAGIC[..]);
        put(&0u32.to_le_bytes());
        put(&self.bitmap_offset.to_le_bytes());
        put(&self.payload_offset.to_le_bytes());
        put(&self.payload_offset.to_le_bytes());
        put(&self.print_time_seconds.to_le_bytes());
        put(&self.filament_right.to_le_bytes());
        put(&self.filament_left.to_le_bytes());
        put(&c.multi_extruder_type.to_le_bytes());
        put(&self.layer_height_microns.to_le_bytes());
        put(&0u16.to_le_bytes());
        put(&c.perimeter_shells.to_le_bytes());
        put(&c.print_speed.to_le_bytes());
        put(&c.platform_temperature.to_le_bytes());
        put(&c.right_extruder_temperature.to_le_bytes());
        put(&c.left_extruder_temperature.to_le_bytes());
        put(&0u16.to_le_bytes());
        out
    }

    /// Read the fixed fields back from container bytes.
    ///
    /// # Errors
    /// Returns `HeaderError::Truncated` for input shorter than the header and
    /// `HeaderError::BadMagic` when the magic does not match.
    pub fn parse(bytes: &[u8]) -> HeaderResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(HeaderError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if &bytes[..MAGIC.len()] != MAGIC {
            return Err(HeaderError::BadMagic);
        }

        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);

        Ok(Self {
            bitmap_offset: u32_at(0x10),
            payload_offset: u32_at(0x14),
            print_time_seconds: u32_at(0x1C) as i32,
            filament_right: u32_at(0x20) as i32,
            filament_left: u32_at(0x24) as i32,
            layer_height_microns: u16_at(0x2A) as i16,
            constants: HeaderConstants {
                multi_extruder_type: u16_at(0x28),
                perimeter_shells: u16_at(0x2E),
                print_speed: u16_at(0x30),
                platform_temperature: u16_at(0x32),
                right_extruder_temperature: u16_at(0x34),
                left_extruder_temperature: u16_at(0x36),
            },
        })
    }
}

fn fit<T: TryFrom<i64>>(field: &'static str, value: i64) -> HeaderResult<T> {
    T::try_from(value).map_err(|_| HeaderError::FieldOverflow {
        field,
        value,
        width: std::mem::size_of::<T>(),
    })
}

/// The fixed-length preview block between header and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapBlock(Vec<u8>);

impl BitmapBlock {
    /// An all-zero block.
    pub fn zeroed() -> Self {
        Self(vec![0; BITMAP_LEN])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for BitmapBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Serializes header, bitmap block and payload into container bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBuilder {
    constants: HeaderConstants,
}

impl HeaderBuilder {
    pub fn new(constants: HeaderConstants) -> Self {
        Self { constants }
    }

    /// Assemble the complete container.
    pub fn build(
        &self,
        metadata: &PrintMetadata,
        bitmap: &BitmapBlock,
        payload: &[u8],
    ) -> HeaderResult<Vec<u8>> {
        let header = ContainerHeader::new(metadata, self.constants)?;
        let mut out = Vec::with_capacity(PAYLOAD_OFFSET + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(bitmap.as_bytes());
        out.extend_from_slice(payload);
        Ok(out)
    }
}

/// Encode text one byte per character (ISO-8859-1).
///
/// # Errors
/// Returns `HeaderError::Unencodable` for the first character above U+00FF.
pub fn encode_latin1(text: &str) -> HeaderResult<Vec<u8>> {
    text.char_indices()
        .map(|(offset, ch)| u8::try_from(ch).map_err(|_| HeaderError::Unencodable { ch, offset }))
        .collect()
}

/// Like [`encode_latin1`], replacing characters above U+00FF with `?`.
pub fn encode_latin1_lossy(text: &str) -> Vec<u8> {
    text.chars().map(|ch| u8::try_from(ch).unwrap_or(b'?')).collect()
}
