//! Buffer acquisition hooks for host media frameworks.
//!
//! A host that owns its frame and packet memory (pooled frames, padded
//! line sizes, preallocated packets) implements [`FrameAllocator`] and
//! [`PacketAllocator`]. The plain `Vec`-returning API uses
//! [`BufferFrameAllocator`] and [`VecAllocator`].

use alloc::vec::Vec;

use crate::buffer::PixelBuffer;
use crate::error::AllocError;
use crate::pixel::PixelLayout;

/// Writable destination for one decoded frame.
///
/// Row `y` (counted from the top) starts at `y * stride`. Only the first
/// `width * bytes_per_pixel` bytes of each row are written.
pub struct FrameMut<'a> {
    pub data: &'a mut [u8],
    pub stride: usize,
}

impl FrameMut<'_> {
    /// Check that the frame can hold `height` rows of `row_bytes` bytes.
    pub(crate) fn check(&self, row_bytes: usize, height: usize) -> Result<(), AllocError> {
        let needed = height
            .checked_sub(1)
            .and_then(|rows| rows.checked_mul(self.stride))
            .and_then(|n| n.checked_add(row_bytes))
            .unwrap_or(usize::MAX);
        if self.stride < row_bytes || self.data.len() < needed {
            return Err(AllocError { requested: needed });
        }
        Ok(())
    }

    pub(crate) fn row_mut(&mut self, y: usize, row_bytes: usize) -> &mut [u8] {
        let start = y * self.stride;
        &mut self.data[start..start + row_bytes]
    }
}

/// Supplies the frame the decoder writes into.
pub trait FrameAllocator {
    fn allocate_frame(
        &mut self,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<FrameMut<'_>, AllocError>;
}

/// Supplies the byte buffer the encoder writes into.
///
/// The returned slice must be exactly `n_bytes` long.
pub trait PacketAllocator {
    fn allocate_packet(&mut self, n_bytes: usize) -> Result<&mut [u8], AllocError>;
}

/// Frame allocator backed by a [`PixelBuffer`].
#[derive(Debug, Default)]
pub struct BufferFrameAllocator {
    frame: Option<PixelBuffer>,
}

impl BufferFrameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently allocated frame.
    pub fn into_frame(self) -> Option<PixelBuffer> {
        self.frame
    }
}

impl FrameAllocator for BufferFrameAllocator {
    fn allocate_frame(
        &mut self,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<FrameMut<'_>, AllocError> {
        let frame = self.frame.insert(PixelBuffer::zeroed(width, height, layout)?);
        let stride = frame.row_bytes();
        Ok(FrameMut {
            data: frame.pixels_mut(),
            stride,
        })
    }
}

/// Packet allocator backed by a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct VecAllocator {
    buf: Vec<u8>,
}

impl VecAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl PacketAllocator for VecAllocator {
    fn allocate_packet(&mut self, n_bytes: usize) -> Result<&mut [u8], AllocError> {
        self.buf.clear();
        self.buf
            .try_reserve_exact(n_bytes)
            .map_err(|_| AllocError { requested: n_bytes })?;
        self.buf.resize(n_bytes, 0);
        Ok(&mut self.buf)
    }
}
