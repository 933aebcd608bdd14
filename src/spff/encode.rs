//! SPFF encoder: uncompressed 8-bit and 24-bit, bottom-up rows.

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::error::EncodeError;
use crate::format::{
    Compression, FIXED_HEADER_SIZE, INFO_HEADER_SIZE_8BIT, INFO_HEADER_SIZE_24BIT, MAGIC,
    aligned_stride, supports,
};

/// Sizes computed before any output is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EncodePlan {
    pub bit_count: u16,
    pub row_bytes: usize,
    pub stride: usize,
    pub info_header_size: u32,
    pub header_size: u32,
    pub file_size: u32,
}

/// Validate `pixels` against `bit_count` and compute the output layout.
pub(crate) fn plan(pixels: &PixelBuffer, bit_count: u16) -> Result<EncodePlan, EncodeError> {
    let (width, height, layout) = (pixels.width, pixels.height, pixels.layout);
    if !supports(bit_count, layout) {
        return Err(EncodeError::UnsupportedPixelFormat { layout, bit_count });
    }
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(EncodeError::DimensionsTooLarge { width, height });
    }

    let row_bytes = pixels.row_bytes();
    let expected = row_bytes
        .checked_mul(height as usize)
        .ok_or(EncodeError::DimensionsTooLarge { width, height })?;
    if pixels.pixels().len() < expected {
        return Err(EncodeError::BufferTooSmall {
            needed: expected,
            actual: pixels.pixels().len(),
        });
    }

    let info_header_size = if bit_count == 8 {
        INFO_HEADER_SIZE_8BIT
    } else {
        INFO_HEADER_SIZE_24BIT
    };
    let header_size = FIXED_HEADER_SIZE + info_header_size;
    let stride = aligned_stride(u64::from(width), layout.bytes_per_pixel() as u64);
    let file_size = u32::try_from(u64::from(header_size) + stride * u64::from(height))
        .map_err(|_| EncodeError::DimensionsTooLarge { width, height })?;

    Ok(EncodePlan {
        bit_count,
        row_bytes,
        stride: stride as usize,
        info_header_size,
        header_size,
        file_size,
    })
}

// ── Slice writer ────────────────────────────────────────────────────

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u16_le(&mut self, v: u16) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_u32_le(&mut self, v: u32) {
        self.put_bytes(&v.to_le_bytes());
    }
}

/// Write the complete file into `out`, which must be `plan.file_size` long.
pub(crate) fn write(
    pixels: &PixelBuffer,
    plan: &EncodePlan,
    out: &mut [u8],
    stop: &dyn Stop,
) -> Result<(), EncodeError> {
    let file_size = plan.file_size as usize;
    if out.len() != file_size {
        return Err(EncodeError::BufferTooSmall {
            needed: file_size,
            actual: out.len(),
        });
    }

    let (header, body) = out.split_at_mut(plan.header_size as usize);
    write_header(header, pixels, plan);

    let swizzle = pixels.layout.needs_swizzle();
    let src_rows = pixels.pixels().chunks_exact(plan.row_bytes).take(pixels.height as usize);

    // Bottom-up: the last canonical row is stored first.
    for (file_row, (src, dst)) in src_rows
        .rev()
        .zip(body.chunks_exact_mut(plan.stride))
        .enumerate()
    {
        if file_row % 16 == 0 {
            stop.check()?;
        }
        let (data, padding) = dst.split_at_mut(plan.row_bytes);
        data.copy_from_slice(src);
        if swizzle {
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        }
        padding.fill(0);
    }

    Ok(())
}

fn write_header(header: &mut [u8], pixels: &PixelBuffer, plan: &EncodePlan) {
    let mut w = Writer {
        buf: header,
        pos: 0,
    };
    w.put_bytes(&MAGIC);
    w.put_u32_le(plan.file_size);
    w.put_u32_le(plan.header_size);

    w.put_u32_le(plan.info_header_size);
    w.put_u32_le(pixels.width);
    w.put_u32_le(pixels.height); // positive = bottom-up
    w.put_u16_le(1); // planes
    w.put_u16_le(plan.bit_count);
    if plan.info_header_size == INFO_HEADER_SIZE_24BIT {
        w.put_u32_le(Compression::Rgb.to_u32());
        w.put_u32_le(plan.file_size - plan.header_size); // image data size
    }
}
