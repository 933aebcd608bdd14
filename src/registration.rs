//! Metadata a host uses to route frames to this codec.

use crate::format::{CAPABILITIES, Capability, MAGIC};
use crate::pixel::PixelLayout;

/// Identity and capabilities of the SPFF codec.
#[derive(Debug)]
pub struct FormatDescriptor {
    /// Short identifier, e.g. for codec lookup by name.
    pub name: &'static str,
    pub long_name: &'static str,
    pub magic: [u8; 2],
    pub extensions: &'static [&'static str],
    pub capabilities: &'static [Capability],
}

/// The SPFF format.
pub static FORMAT: FormatDescriptor = FormatDescriptor {
    name: "spff",
    long_name: "SPFF still image",
    magic: MAGIC,
    extensions: &["spff"],
    capabilities: CAPABILITIES,
};

impl FormatDescriptor {
    /// Whether `data` starts with this format's magic bytes.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.starts_with(&self.magic)
    }

    /// Every layout the codec accepts, across all bit depths.
    pub fn layouts(&self) -> impl Iterator<Item = PixelLayout> + '_ {
        self.capabilities
            .iter()
            .flat_map(|cap| cap.layouts.iter().copied())
    }

    /// Bit depth a host should request for frames in `layout`.
    pub fn bit_count_for(&self, layout: PixelLayout) -> Option<u16> {
        self.capabilities
            .iter()
            .find(|cap| cap.layouts.contains(&layout))
            .map(|cap| cap.bit_count)
    }
}
