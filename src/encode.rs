use alloc::vec::Vec;
use enough::{Stop, Unstoppable};

use crate::buffer::PixelBuffer;
use crate::error::EncodeError;
use crate::host::PacketAllocator;
use crate::spff;

/// Encode `pixels` as an SPFF file with `bit_count` bits per pixel.
///
/// `bit_count` must be 8 or 24 and must match the buffer's layout.
pub fn encode(pixels: &PixelBuffer, bit_count: u16) -> Result<Vec<u8>, EncodeError> {
    EncodeRequest::new()
        .with_bit_count(bit_count)
        .encode(pixels, Unstoppable)
}

/// Configurable SPFF encode.
#[derive(Clone, Copy, Debug, Default)]
pub struct EncodeRequest {
    bit_count: Option<u16>,
}

impl EncodeRequest {
    /// Encode at the bit depth implied by the buffer's layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a specific bit depth.
    pub fn with_bit_count(mut self, bit_count: u16) -> Self {
        self.bit_count = Some(bit_count);
        self
    }

    pub fn encode(&self, pixels: &PixelBuffer, stop: impl Stop) -> Result<Vec<u8>, EncodeError> {
        spff::encode(pixels, self.bit_count_for(pixels), &stop)
    }

    /// Encode into a packet obtained from `packets`. Returns the number of
    /// bytes written, which equals the packet size requested.
    pub fn encode_into_packet(
        &self,
        pixels: &PixelBuffer,
        packets: &mut dyn PacketAllocator,
        stop: impl Stop,
    ) -> Result<usize, EncodeError> {
        spff::encode_into_packet(pixels, self.bit_count_for(pixels), packets, &stop)
    }

    fn bit_count_for(&self, pixels: &PixelBuffer) -> u16 {
        self.bit_count.unwrap_or_else(|| pixels.layout.bit_count())
    }
}
