//! SPFF header parser and row copier.
//!
//! The parser recovers from three known producer bugs (over-declared file
//! size, header-sized file size, missing row padding) and reports each one to
//! the [`Diagnostics`] sink instead of failing.

use enough::Stop;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::DecodeError;
use crate::format::{
    COMPRESSION_FIELD_MIN_INFO_SIZE, Compression, FIXED_HEADER_SIZE, MAGIC, MIN_INFO_HEADER_SIZE,
    ScanDirection, SpffHeader, compute_stride, compute_unaligned_stride, layouts_for_bit_count,
    minimum_payload,
};
use crate::host::FrameMut;
use crate::pixel::PixelLayout;

/// Largest row stride that is a multiple of 4 and fits a `u32`.
const MAX_STRIDE: u32 = u32::MAX & !3;

// ── Cursor for reading from &[u8] ───────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos.checked_add(N).ok_or(DecodeError::Truncated)?;
        let bytes = self.data.get(self.pos..end).ok_or(DecodeError::Truncated)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        self.pos = end;
        Ok(buf)
    }

    fn get_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.read_fixed_bytes().map(u16::from_le_bytes)
    }

    fn get_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.read_fixed_bytes().map(u32::from_le_bytes)
    }

    fn get_i32_le(&mut self) -> Result<i32, DecodeError> {
        self.read_fixed_bytes().map(i32::from_le_bytes)
    }
}

// ── Header ──────────────────────────────────────────────────────────

/// A validated header plus the row stride the payload was found to use.
#[derive(Clone, Debug)]
pub(crate) struct ParsedHeader {
    pub header: SpffHeader,
    /// Bytes between the starts of consecutive stored rows. Either the padded
    /// stride or, for files written without padding, the raw row length.
    pub row_stride: usize,
}

/// Parse and validate everything up to (not including) the pixel rows.
pub(crate) fn parse_header(
    data: &[u8],
    diagnostics: &dyn Diagnostics,
) -> Result<ParsedHeader, DecodeError> {
    if data.len() < FIXED_HEADER_SIZE as usize {
        return Err(DecodeError::Truncated);
    }

    let mut cursor = Cursor::new(data);
    if cursor.read_fixed_bytes::<2>()? != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let declared_size = cursor.get_u32_le()?;
    let header_size = cursor.get_u32_le()?;
    let info_header_size = cursor.get_u32_le()?;

    let data_len = u32::try_from(data.len()).unwrap_or(u32::MAX);
    let mut file_size = declared_size;
    if file_size > data_len {
        diagnostics.warn(&Warning::DeclaredSizeClamped {
            declared: file_size,
            actual: data_len,
        });
        file_size = data_len;
    }

    if u64::from(info_header_size) + u64::from(FIXED_HEADER_SIZE) > u64::from(header_size) {
        return Err(DecodeError::InvalidHeaderSize(alloc::format!(
            "info header size {info_header_size} does not fit in header size {header_size}"
        )));
    }
    if info_header_size < MIN_INFO_HEADER_SIZE {
        return Err(DecodeError::InvalidHeaderSize(alloc::format!(
            "info header size {info_header_size} is below the minimum of {MIN_INFO_HEADER_SIZE}"
        )));
    }

    // Some producers write a header size where the file size belongs.
    if file_size == FIXED_HEADER_SIZE
        || u64::from(file_size) == u64::from(info_header_size) + u64::from(FIXED_HEADER_SIZE)
    {
        let repaired = data_len.saturating_sub(2);
        diagnostics.warn(&Warning::FileSizeRepaired {
            declared: file_size,
            repaired,
        });
        file_size = repaired;
    }

    if file_size <= header_size {
        return Err(DecodeError::InvalidHeaderSize(alloc::format!(
            "declared file size is less than header size ({file_size} <= {header_size})"
        )));
    }

    let width = cursor.get_i32_le()?;
    let stored_height = cursor.get_i32_le()?;
    if width <= 0 || stored_height == 0 {
        return Err(DecodeError::InvalidDimensions {
            width,
            height: stored_height,
        });
    }
    let scan_direction = ScanDirection::from_stored_height(stored_height);
    let width = width.unsigned_abs();
    let height = stored_height.unsigned_abs();

    let planes = cursor.get_u16_le()?;
    if planes != 1 {
        return Err(DecodeError::InvalidHeader(alloc::format!(
            "planes field is {planes}, expected 1"
        )));
    }

    let bit_count = cursor.get_u16_le()?;
    if layouts_for_bit_count(bit_count).is_none() {
        return Err(DecodeError::UnsupportedBitDepth(bit_count));
    }

    let compression = if info_header_size >= COMPRESSION_FIELD_MIN_INFO_SIZE {
        Compression::from_u32(cursor.get_u32_le()?)
    } else {
        Compression::Rgb
    };
    if compression != Compression::Rgb {
        return Err(DecodeError::UnsupportedCompression(compression));
    }

    // A padded row must be addressable as a u32 stride.
    let unaligned_stride = compute_unaligned_stride(width, bit_count);
    if unaligned_stride > u64::from(MAX_STRIDE) {
        return Err(DecodeError::InvalidDimensions {
            width: width as i32,
            height: stored_height,
        });
    }

    let available = (data.len() as u64).saturating_sub(u64::from(header_size));
    let padded_stride = compute_stride(width, u32::from(bit_count / 8));
    let padded_size = minimum_payload(padded_stride, height);

    let row_stride = if padded_size <= available {
        u64::from(padded_stride)
    } else {
        let unaligned_size = unaligned_stride * u64::from(height);
        if unaligned_size > available {
            return Err(DecodeError::InsufficientData {
                needed: unaligned_size,
                actual: available,
            });
        }
        diagnostics.warn(&Warning::UnalignedRowsAssumed {
            available,
            padded_size,
        });
        unaligned_stride
    };

    Ok(ParsedHeader {
        header: SpffHeader {
            file_size,
            header_size,
            info_header_size,
            width,
            height,
            scan_direction,
            planes,
            bit_count,
            compression,
        },
        // Bounded by `available`, which came from a slice length.
        row_stride: row_stride as usize,
    })
}

/// Resolve the output layout, defaulting to the native one for the depth.
pub(crate) fn resolve_layout(
    header: &SpffHeader,
    requested: Option<PixelLayout>,
) -> Result<PixelLayout, DecodeError> {
    let layouts = layouts_for_bit_count(header.bit_count)
        .ok_or(DecodeError::UnsupportedBitDepth(header.bit_count))?;
    match requested {
        None => layouts
            .first()
            .copied()
            .ok_or(DecodeError::UnsupportedBitDepth(header.bit_count)),
        Some(layout) if layouts.contains(&layout) => Ok(layout),
        Some(layout) => Err(DecodeError::LayoutMismatch {
            requested: layout,
            bit_count: header.bit_count,
        }),
    }
}

// ── Rows ────────────────────────────────────────────────────────────

/// Copy the stored rows into `frame` in top-to-bottom order.
pub(crate) fn decode_rows(
    data: &[u8],
    parsed: &ParsedHeader,
    layout: PixelLayout,
    mut frame: FrameMut<'_>,
    stop: &dyn Stop,
) -> Result<(), DecodeError> {
    let header = &parsed.header;
    let height = header.height as usize;
    let row_bytes = header.width as usize * layout.bytes_per_pixel();
    frame.check(row_bytes, height)?;

    let payload = data
        .get(header.header_size as usize..)
        .ok_or(DecodeError::InsufficientData {
            needed: parsed.row_stride as u64 * u64::from(header.height),
            actual: 0,
        })?;

    let mut rows_copied = 0;
    for (file_row, src) in payload
        .chunks_exact(parsed.row_stride)
        .take(height)
        .enumerate()
    {
        if file_row % 16 == 0 {
            stop.check()?;
        }
        let Some(y) = header.scan_direction.canonical_row(file_row, height) else {
            break;
        };
        let dst = frame.row_mut(y, row_bytes);
        dst.copy_from_slice(&src[..row_bytes]);
        if layout.needs_swizzle() {
            for px in dst.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        }
        rows_copied += 1;
    }

    if rows_copied != height {
        return Err(DecodeError::InsufficientData {
            needed: parsed.row_stride as u64 * u64::from(header.height),
            actual: payload.len() as u64,
        });
    }
    Ok(())
}
