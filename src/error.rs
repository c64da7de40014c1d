//! Error type returned by [`Station`](crate::Station).
//!
//! Carries the hardware error unchanged so callers can inspect it. No
//! allocation; the variants hold only the wrapped driver errors.

use core::fmt;

/// A hardware failure while running the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationError<P, S> {
    /// Writing an output pin (sounder, busy, lamp or selector scan) failed.
    Output(P),
    /// Reading or writing the settings storage failed.
    Storage(S),
}

impl<P: fmt::Debug, S: fmt::Debug> fmt::Display for StationError<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Output(e) => write!(f, "output write failed: {:?}", e),
            StationError::Storage(e) => write!(f, "settings storage failed: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<P: fmt::Debug, S: fmt::Debug> std::error::Error for StationError<P, S> {}
