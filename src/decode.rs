use enough::{Stop, Unstoppable};

use crate::buffer::PixelBuffer;
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::error::DecodeError;
use crate::format::SpffHeader;
use crate::host::FrameAllocator;
use crate::limits::Limits;
use crate::pixel::PixelLayout;
use crate::spff::{self, DecodeOptions};

/// Decode an SPFF buffer into its header and a top-to-bottom pixel buffer.
///
/// Warnings go to the [`log`] crate; use [`DecodeRequest`] to pick another
/// sink, an output layout, or limits.
pub fn decode(bytes: &[u8]) -> Result<(SpffHeader, PixelBuffer), DecodeError> {
    DecodeRequest::new(bytes).decode(Unstoppable)
}

/// Configurable decode of one SPFF buffer.
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    layout: Option<PixelLayout>,
    limits: Option<&'a Limits>,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            layout: None,
            limits: None,
            diagnostics: &LogDiagnostics,
        }
    }

    /// Request a specific output layout instead of the native one.
    ///
    /// The layout must be listed for the file's bit depth in
    /// [`crate::CAPABILITIES`]; otherwise decoding fails with
    /// [`DecodeError::LayoutMismatch`].
    pub fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Send tolerated-input warnings to `diagnostics` instead of the `log` crate.
    pub fn with_diagnostics(mut self, diagnostics: &'a dyn Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<(SpffHeader, PixelBuffer), DecodeError> {
        spff::decode(self.data, &self.options(), &stop)
    }

    /// Decode into a frame obtained from `frames`.
    ///
    /// Returns the header and the layout written to the frame.
    pub fn decode_into_frame(
        self,
        frames: &mut dyn FrameAllocator,
        stop: impl Stop,
    ) -> Result<(SpffHeader, PixelLayout), DecodeError> {
        spff::decode_into_frame(self.data, &self.options(), frames, &stop)
    }

    fn options(&self) -> DecodeOptions<'a> {
        DecodeOptions {
            layout: self.layout,
            limits: self.limits,
            diagnostics: self.diagnostics,
        }
    }
}
