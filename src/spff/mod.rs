//! SPFF decoder and encoder (internal).
//!
//! Use top-level [`crate::decode`], [`crate::encode`], or the request builders.

mod decode;
mod encode;

use alloc::vec::Vec;
use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::diagnostics::Diagnostics;
use crate::error::{DecodeError, EncodeError};
use crate::format::SpffHeader;
use crate::host::{BufferFrameAllocator, FrameAllocator, PacketAllocator, VecAllocator};
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// Options shared by every decode entry point.
pub(crate) struct DecodeOptions<'a> {
    pub layout: Option<PixelLayout>,
    pub limits: Option<&'a Limits>,
    pub diagnostics: &'a dyn Diagnostics,
}

/// Validate the header only (steps up to the payload bounds check).
pub(crate) fn probe(data: &[u8], diagnostics: &dyn Diagnostics) -> Result<SpffHeader, DecodeError> {
    decode::parse_header(data, diagnostics).map(|parsed| parsed.header)
}

/// Decode into a frame supplied by `frames`. Returns the header and the
/// layout that was written.
pub(crate) fn decode_into_frame(
    data: &[u8],
    options: &DecodeOptions<'_>,
    frames: &mut dyn FrameAllocator,
    stop: &dyn Stop,
) -> Result<(SpffHeader, PixelLayout), DecodeError> {
    let parsed = decode::parse_header(data, options.diagnostics)?;
    let layout = decode::resolve_layout(&parsed.header, options.layout)?;
    check_limits(options.limits, &parsed.header, layout)?;
    stop.check()?;

    let frame = frames.allocate_frame(parsed.header.width, parsed.header.height, layout)?;
    decode::decode_rows(data, &parsed, layout, frame, stop)?;
    Ok((parsed.header, layout))
}

/// Decode into a freshly allocated [`PixelBuffer`].
pub(crate) fn decode(
    data: &[u8],
    options: &DecodeOptions<'_>,
    stop: &dyn Stop,
) -> Result<(SpffHeader, PixelBuffer), DecodeError> {
    let mut frames = BufferFrameAllocator::new();
    let (header, _) = decode_into_frame(data, options, &mut frames, stop)?;
    let buffer = frames.into_frame().ok_or(DecodeError::AllocationFailed { requested: 0 })?;
    Ok((header, buffer))
}

fn check_limits(
    limits: Option<&Limits>,
    header: &SpffHeader,
    layout: PixelLayout,
) -> Result<(), DecodeError> {
    if let Some(limits) = limits {
        limits.check(header.width, header.height)?;
        let out_bytes = u64::from(header.width)
            * u64::from(header.height)
            * layout.bytes_per_pixel() as u64;
        limits.check_memory(out_bytes)?;
    }
    Ok(())
}

/// Encode into a packet supplied by `packets`. Returns the packet length.
pub(crate) fn encode_into_packet(
    pixels: &PixelBuffer,
    bit_count: u16,
    packets: &mut dyn PacketAllocator,
    stop: &dyn Stop,
) -> Result<usize, EncodeError> {
    let plan = encode::plan(pixels, bit_count)?;
    stop.check()?;
    let n_bytes = plan.file_size as usize;
    let out = packets.allocate_packet(n_bytes)?;
    encode::write(pixels, &plan, out, stop)?;
    Ok(n_bytes)
}

/// Encode into a freshly allocated `Vec<u8>`.
pub(crate) fn encode(
    pixels: &PixelBuffer,
    bit_count: u16,
    stop: &dyn Stop,
) -> Result<Vec<u8>, EncodeError> {
    let mut packets = VecAllocator::new();
    encode_into_packet(pixels, bit_count, &mut packets, stop)?;
    Ok(packets.into_vec())
}
