//! # spff
//!
//! Decoder and encoder for SPFF, a single-frame raw raster container.
//!
//! ## Format
//!
//! An SPFF file is a small little-endian header (magic `"SF"`, file size,
//! pixel-data offset, info header with width, signed height, planes and bit
//! depth) followed by uncompressed rows padded to 4 bytes. A positive height
//! means rows are stored bottom-up, a negative height top-down. See
//! [`format`] for the byte layout.
//!
//! ## Supported depths
//!
//! | bit_count | layouts |
//! |---|---|
//! | 8  | [`PixelLayout::Indexed8`] (native), [`PixelLayout::Gray8`] |
//! | 24 | [`PixelLayout::Bgr24`] (native), [`PixelLayout::Rgb24`] |
//!
//! ## Tolerated input
//!
//! The decoder accepts three known producer bugs and reports each through a
//! [`Diagnostics`] sink (the `log` crate by default):
//!
//! - a declared file size larger than the buffer (clamped),
//! - a file size field holding a header size (recomputed),
//! - rows written without 4-byte padding (retried once unpadded).
//!
//! ## Non-Goals
//!
//! - Multiple frames or animation
//! - RLE and bitfield compression (recognized, reported, not decoded)
//! - Palettes (8-bit data is returned as raw indices)
//!
//! ## Usage
//!
//! ```
//! use spff::{PixelBuffer, PixelLayout};
//!
//! let pixels = PixelBuffer::new(
//!     vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
//!     2,
//!     2,
//!     PixelLayout::Rgb24,
//! )?;
//! let bytes = spff::encode(&pixels, 24)?;
//! assert_eq!(&bytes[..2], b"SF");
//!
//! let (header, decoded) = spff::DecodeRequest::new(&bytes)
//!     .with_layout(PixelLayout::Rgb24)
//!     .decode(spff::Unstoppable)?;
//! assert_eq!((header.width, header.height), (2, 2));
//! assert_eq!(decoded, pixels);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod diagnostics;
mod error;
pub mod format;
pub mod host;
mod info;
mod limits;
mod pixel;
mod registration;
mod spff;

mod decode;
mod encode;

// Re-exports
pub use buffer::PixelBuffer;
pub use decode::{DecodeRequest, decode};
pub use diagnostics::{Diagnostics, LogDiagnostics, Silent, Warning};
pub use encode::{EncodeRequest, encode};
pub use enough::{Stop, Unstoppable};
pub use error::{AllocError, DecodeError, EncodeError};
pub use format::{
    CAPABILITIES, Capability, Compression, ScanDirection, SpffHeader, compute_stride,
    compute_unaligned_stride, minimum_payload,
};
pub use info::ImageInfo;
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::SpffPixel;
pub use pixel::PixelLayout;
pub use registration::{FORMAT, FormatDescriptor};
