use alloc::string::String;
use enough::StopReason;

use crate::format::Compression;
use crate::pixel::PixelLayout;

/// Errors from SPFF decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("input too short for an SPFF header")]
    Truncated,

    #[error("bad magic number, expected \"SF\"")]
    BadMagic,

    #[error("invalid header size: {0}")]
    InvalidHeaderSize(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid dimensions: width {width}, height {height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("bit depth {0} not supported")]
    UnsupportedBitDepth(u16),

    #[error("compression {0:?} not supported")]
    UnsupportedCompression(Compression),

    #[error("not enough pixel data: need {needed} bytes, got {actual}")]
    InsufficientData { needed: u64, actual: u64 },

    #[error("layout {requested:?} cannot be produced from {bit_count}-bit data")]
    LayoutMismatch {
        requested: PixelLayout,
        bit_count: u16,
    },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("frame allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl DecodeError {
    /// True when the file uses a known format variant this codec does not
    /// implement (RLE or bitfields), as opposed to being corrupt.
    pub fn is_unimplemented_variant(&self) -> bool {
        matches!(self, Self::UnsupportedCompression(c) if c.is_recognized())
    }
}

impl From<StopReason> for DecodeError {
    fn from(r: StopReason) -> Self {
        DecodeError::Cancelled(r)
    }
}

/// Errors from SPFF encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("cannot encode {layout:?} at {bit_count} bits per pixel")]
    UnsupportedPixelFormat { layout: PixelLayout, bit_count: u16 },

    #[error("packet allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for EncodeError {
    fn from(r: StopReason) -> Self {
        EncodeError::Cancelled(r)
    }
}

/// Failure reported by a host allocator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("allocation of {requested} bytes failed")]
pub struct AllocError {
    pub requested: usize,
}

impl From<AllocError> for DecodeError {
    fn from(e: AllocError) -> Self {
        DecodeError::AllocationFailed {
            requested: e.requested,
        }
    }
}

impl From<AllocError> for EncodeError {
    fn from(e: AllocError) -> Self {
        EncodeError::AllocationFailed {
            requested: e.requested,
        }
    }
}
