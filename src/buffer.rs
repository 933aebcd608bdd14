use alloc::vec::Vec;

use crate::error::{AllocError, EncodeError};
use crate::pixel::PixelLayout;

/// Canonical pixel buffer: row-major, top row first, no row padding.
///
/// This is the representation both directions agree on, independent of the
/// scan direction stored in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

impl PixelBuffer {
    /// Wrap `pixels`, which must hold exactly `width * height` pixels of `layout`.
    pub fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, EncodeError> {
        let needed = buffer_len(width, height, layout)
            .ok_or(EncodeError::DimensionsTooLarge { width, height })?;
        if pixels.len() != needed {
            return Err(EncodeError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            layout,
        })
    }

    /// Zero-filled buffer, allocated fallibly.
    pub(crate) fn zeroed(
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, AllocError> {
        let requested = buffer_len(width, height, layout).ok_or(AllocError {
            requested: usize::MAX,
        })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(requested)
            .map_err(|_| AllocError { requested })?;
        pixels.resize(requested, 0);
        Ok(Self {
            pixels,
            width,
            height,
            layout,
        })
    }

    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_vec(self) -> Vec<u8> {
        self.pixels
    }

    /// Bytes in one unpadded row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.layout.bytes_per_pixel()
    }

    /// Row `y`, counted from the top.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let row_bytes = self.row_bytes();
        let start = (y as usize).checked_mul(row_bytes)?;
        self.pixels.get(start..start.checked_add(row_bytes)?)
    }

    /// Bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width {
            return None;
        }
        let bpp = self.layout.bytes_per_pixel();
        let start = x as usize * bpp;
        self.row(y)?.get(start..start + bpp)
    }

    /// Reinterpret pixel data as typed pixel slice.
    ///
    /// Returns `None` if the layout does not match `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::SpffPixel>(&self) -> Option<&[P]>
    where
        [u8]: rgb::AsPixels<P>,
    {
        use rgb::AsPixels as _;

        if !self.layout.is_memory_compatible(P::layout()) {
            return None;
        }
        Some(self.pixels.as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::SpffPixel>(&self) -> Option<imgref::ImgRef<'_, P>>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Some(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Copy into an [`imgref::ImgVec`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::SpffPixel>(&self) -> Option<imgref::ImgVec<P>>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Some(imgref::ImgVec::new(
            pixels.to_vec(),
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Build a buffer from a typed image, dropping any stride padding.
    #[cfg(feature = "imgref")]
    pub fn from_imgref<P: crate::SpffPixel>(img: imgref::ImgRef<'_, P>) -> Result<Self, EncodeError>
    where
        [P]: rgb::ComponentBytes<u8>,
    {
        use rgb::ComponentBytes as _;

        let too_large = EncodeError::DimensionsTooLarge {
            width: img.width().min(u32::MAX as usize) as u32,
            height: img.height().min(u32::MAX as usize) as u32,
        };
        let (Ok(width), Ok(height)) = (u32::try_from(img.width()), u32::try_from(img.height()))
        else {
            return Err(too_large);
        };
        let len = buffer_len(width, height, P::layout()).ok_or(too_large)?;
        let mut pixels = Vec::with_capacity(len);
        for row in img.rows() {
            pixels.extend_from_slice(row.as_bytes());
        }
        Self::new(pixels, width, height, P::layout())
    }
}

fn buffer_len(width: u32, height: u32, layout: PixelLayout) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|wh| wh.checked_mul(layout.bytes_per_pixel()))
}
