use crate::diagnostics::Silent;
use crate::error::DecodeError;
use crate::format::{ScanDirection, SpffHeader};
use crate::pixel::PixelLayout;
use crate::spff;

/// Image metadata read from the header without copying pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_count: u16,
    pub native_layout: PixelLayout,
    pub scan_direction: ScanDirection,
}

impl ImageInfo {
    /// Probe an SPFF buffer.
    ///
    /// Runs every header and payload-size check the decoder runs, so a
    /// successful probe means [`crate::decode`] will succeed. Tolerated-input
    /// warnings are not reported here.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let header = spff::probe(data, &Silent)?;
        Self::from_header(&header)
    }

    fn from_header(header: &SpffHeader) -> Result<Self, DecodeError> {
        let native_layout = header
            .native_layout()
            .ok_or(DecodeError::UnsupportedBitDepth(header.bit_count))?;
        Ok(Self {
            width: header.width,
            height: header.height,
            bit_count: header.bit_count,
            native_layout,
            scan_direction: header.scan_direction,
        })
    }
}
