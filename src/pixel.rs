/// Canonical in-memory pixel layout.
///
/// Every layout stores one pixel per `bytes_per_pixel()` bytes, row-major,
/// top row first, with no row padding.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Single byte per pixel, interpreted by the host as a palette index.
    Indexed8,
    /// Single channel, 8-bit grayscale.
    Gray8,
    /// 3 channels, 8-bit B,G,R. Matches the on-disk 24-bit order.
    Bgr24,
    /// 3 channels, 8-bit R,G,B.
    Rgb24,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Indexed8 | Self::Gray8 => 1,
            Self::Bgr24 | Self::Rgb24 => 3,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Indexed8 | Self::Gray8 => 1,
            Self::Bgr24 | Self::Rgb24 => 3,
        }
    }

    /// Bits per pixel as written to the `bit_count` header field.
    pub fn bit_count(&self) -> u16 {
        (self.bytes_per_pixel() * 8) as u16
    }

    /// Whether channel order must be reversed to match the on-disk order.
    pub(crate) fn needs_swizzle(&self) -> bool {
        matches!(self, Self::Rgb24)
    }

    /// Whether this layout has the same memory representation as `other`.
    ///
    /// `Indexed8` and `Gray8` are compatible: both are one opaque byte per pixel.
    pub fn is_memory_compatible(&self, other: PixelLayout) -> bool {
        if *self == other {
            return true;
        }
        matches!(
            (*self, other),
            (Self::Indexed8, Self::Gray8) | (Self::Gray8, Self::Indexed8)
        )
    }
}

/// Typed pixel that maps onto a [`PixelLayout`].
#[cfg(feature = "rgb")]
pub trait SpffPixel: Copy + 'static {
    /// The layout this pixel type reinterprets.
    fn layout() -> PixelLayout;
}

#[cfg(feature = "rgb")]
impl SpffPixel for rgb::Rgb<u8> {
    fn layout() -> PixelLayout {
        PixelLayout::Rgb24
    }
}

#[cfg(feature = "rgb")]
impl SpffPixel for rgb::alt::BGR<u8> {
    fn layout() -> PixelLayout {
        PixelLayout::Bgr24
    }
}

#[cfg(feature = "rgb")]
impl SpffPixel for rgb::Gray<u8> {
    fn layout() -> PixelLayout {
        PixelLayout::Gray8
    }
}
