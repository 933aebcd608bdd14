//! SPFF wire layout shared by the encoder and decoder.
//!
//! ```text
//! offset  size  field
//!      0     2  magic "SF"
//!      2     4  file_size         (u32 LE, advisory)
//!      6     4  header_size       (u32 LE, offset of pixel data)
//!     10     4  info_header_size  (u32 LE, counted from offset 10)
//!     14     4  width             (i32 LE, > 0)
//!     18     4  height            (i32 LE, > 0 bottom-up, < 0 top-down)
//!     22     2  planes            (u16 LE, == 1)
//!     24     2  bit_count         (u16 LE, 8 or 24)
//!     26     4  compression       (u32 LE, only if info_header_size >= 40)
//! ```
//!
//! Rows are padded to a multiple of 4 bytes.

use crate::pixel::PixelLayout;

/// Magic bytes at offset 0.
pub const MAGIC: [u8; 2] = *b"SF";

/// Magic plus the `file_size` and `header_size` fields.
pub const FIXED_HEADER_SIZE: u32 = 10;

/// Info header written for 8-bit images: size, width, height, planes, bit_count.
pub const INFO_HEADER_SIZE_8BIT: u32 = 16;

/// Info header written for 24-bit images: the 8-bit fields plus compression
/// and image data size.
pub const INFO_HEADER_SIZE_24BIT: u32 = 24;

/// Smallest info header that still covers width, height, planes and bit_count.
pub const MIN_INFO_HEADER_SIZE: u32 = 16;

/// Info header size from which the compression field is read.
pub const COMPRESSION_FIELD_MIN_INFO_SIZE: u32 = 40;

/// Row alignment in bytes.
pub const ROW_ALIGNMENT: u32 = 4;

// ── Stride ──────────────────────────────────────────────────────────

/// Serialized row length in bytes, padded to a multiple of 4.
///
/// Inputs are expected to be pre-validated so that `width * bytes_per_pixel`
/// fits in a `u32`; larger products saturate to the largest aligned `u32`.
pub fn compute_stride(width: u32, bytes_per_pixel: u32) -> u32 {
    let stride = aligned_stride(u64::from(width), u64::from(bytes_per_pixel));
    u32::try_from(stride).unwrap_or(u32::MAX & !(ROW_ALIGNMENT - 1))
}

/// Row length without padding: `ceil(width * bit_count / 8)`.
///
/// Used by the decoder when a file does not carry the padded layout.
pub fn compute_unaligned_stride(width: u32, bit_count: u16) -> u64 {
    (u64::from(width) * u64::from(bit_count)).div_ceil(8)
}

/// Minimum pixel payload for `height` rows of `stride` bytes.
pub fn minimum_payload(stride: u32, height: u32) -> u64 {
    u64::from(stride) * u64::from(height)
}

pub(crate) fn aligned_stride(width: u64, bytes_per_pixel: u64) -> u64 {
    let align = u64::from(ROW_ALIGNMENT);
    (width * bytes_per_pixel).div_ceil(align) * align
}

// ── Compression ─────────────────────────────────────────────────────

/// Value of the optional compression field.
///
/// Only [`Compression::Rgb`] is decodable. The other named variants are
/// recognized so callers can tell "known but unimplemented" from corrupt data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed rows.
    Rgb,
    /// 8-bit run length encoding.
    Rle8,
    /// 4-bit run length encoding.
    Rle4,
    /// Channel bit masks.
    Bitfields,
    /// Any other code.
    Unknown(u32),
}

impl Compression {
    pub fn from_u32(code: u32) -> Self {
        match code {
            0 => Self::Rgb,
            1 => Self::Rle8,
            2 => Self::Rle4,
            3 => Self::Bitfields,
            other => Self::Unknown(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            Self::Rgb => 0,
            Self::Rle8 => 1,
            Self::Rle4 => 2,
            Self::Bitfields => 3,
            Self::Unknown(code) => code,
        }
    }

    /// Whether this is one of the four named codes.
    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

// ── Scan direction ──────────────────────────────────────────────────

/// Order in which rows are stored in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanDirection {
    /// First stored row is the bottom of the image (positive height).
    BottomUp,
    /// First stored row is the top of the image (negative height).
    TopDown,
}

impl ScanDirection {
    pub fn from_stored_height(height: i32) -> Self {
        if height < 0 { Self::TopDown } else { Self::BottomUp }
    }

    /// Canonical (top-to-bottom) row index of the `file_row`-th stored row.
    ///
    /// Returns `None` if `file_row` is not below `height`.
    pub fn canonical_row(self, file_row: usize, height: usize) -> Option<usize> {
        if file_row >= height {
            return None;
        }
        match self {
            Self::BottomUp => Some(height - 1 - file_row),
            Self::TopDown => Some(file_row),
        }
    }
}

// ── Header ──────────────────────────────────────────────────────────

/// A validated SPFF header.
///
/// `height` is always the positive pixel height; the stored sign is kept in
/// `scan_direction`. `file_size` holds the value after clamping and repair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpffHeader {
    pub file_size: u32,
    pub header_size: u32,
    pub info_header_size: u32,
    pub width: u32,
    pub height: u32,
    pub scan_direction: ScanDirection,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: Compression,
}

impl SpffHeader {
    pub fn bytes_per_pixel(&self) -> u32 {
        u32::from(self.bit_count) / 8
    }

    /// Padded row length in bytes.
    pub fn stride(&self) -> u32 {
        compute_stride(self.width, self.bytes_per_pixel())
    }

    /// Layout the decoder produces when the caller does not ask for one.
    pub fn native_layout(&self) -> Option<PixelLayout> {
        native_layout(self.bit_count)
    }
}

// ── Capability table ────────────────────────────────────────────────

/// Layouts accepted for one bit depth. The first layout is the native one.
#[derive(Clone, Copy, Debug)]
pub struct Capability {
    pub bit_count: u16,
    pub layouts: &'static [PixelLayout],
}

/// Bit depth to pixel layout table consulted by both directions.
pub static CAPABILITIES: &[Capability] = &[
    Capability {
        bit_count: 8,
        layouts: &[PixelLayout::Indexed8, PixelLayout::Gray8],
    },
    Capability {
        bit_count: 24,
        layouts: &[PixelLayout::Bgr24, PixelLayout::Rgb24],
    },
];

/// Layouts supported for `bit_count`, or `None` for an unsupported depth.
pub fn layouts_for_bit_count(bit_count: u16) -> Option<&'static [PixelLayout]> {
    CAPABILITIES
        .iter()
        .find(|cap| cap.bit_count == bit_count)
        .map(|cap| cap.layouts)
}

/// Native layout for `bit_count`.
pub fn native_layout(bit_count: u16) -> Option<PixelLayout> {
    layouts_for_bit_count(bit_count).and_then(|layouts| layouts.first().copied())
}

/// Whether `layout` can be stored at `bit_count`.
pub fn supports(bit_count: u16, layout: PixelLayout) -> bool {
    layouts_for_bit_count(bit_count).is_some_and(|layouts| layouts.contains(&layout))
}
