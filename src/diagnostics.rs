//! Non-fatal warnings raised while decoding.
//!
//! The decoder tolerates a few known producer bugs instead of failing. Each
//! time it does, it reports a [`Warning`] to the [`Diagnostics`] sink supplied
//! by the host. The codec keeps no state about what it has already reported;
//! rate limiting is up to the sink.

use core::fmt;

/// A tolerated inconsistency in the input.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// `file_size` claimed more bytes than the buffer holds; it was clamped.
    DeclaredSizeClamped { declared: u32, actual: u32 },
    /// `file_size` held a header-sized value and was recomputed from the
    /// buffer length.
    FileSizeRepaired { declared: u32, repaired: u32 },
    /// Padded rows did not fit, so unpadded rows were assumed.
    UnalignedRowsAssumed { available: u64, padded_size: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclaredSizeClamped { declared, actual } => write!(
                f,
                "not enough data ({actual} < {declared}), trying to decode anyway"
            ),
            Self::FileSizeRepaired { declared, repaired } => write!(
                f,
                "declared file size {declared} looks like a header size, using {repaired}"
            ),
            Self::UnalignedRowsAssumed {
                available,
                padded_size,
            } => write!(
                f,
                "data size too small ({available} < {padded_size}), assuming missing line alignment"
            ),
        }
    }
}

/// Sink for decoder warnings.
pub trait Diagnostics {
    fn warn(&self, warning: &Warning);
}

/// Forwards warnings to the [`log`] crate under the `spff` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, warning: &Warning) {
        log::warn!(target: "spff", "{warning}");
    }
}

/// Discards all warnings.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Diagnostics for Silent {
    fn warn(&self, _warning: &Warning) {}
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn warn(&self, warning: &Warning) {
        (**self).warn(warning)
    }
}
