use core::fmt::Display;
use std::borrow::Cow;

/// Error types used by the hook engine.
///
/// Every failure during an installation pass is local: the installer logs it and
/// moves on to the next module or hook. These variants therefore only surface from
/// the lower layers (memory map access, page protection changes) before being
/// absorbed into skip-and-continue.
#[derive(Debug)]
pub enum Error {
    /// The process memory-map listing could not be read.
    Maps {
        /// A descriptive message about the failure.
        msg: Cow<'static, str>,
    },
    /// A page protection change failed.
    Protect {
        /// A descriptive message about the failure.
        msg: Cow<'static, str>,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Maps { msg } => write!(f, "memory map error: {msg}"),
            Error::Protect { msg } => write!(f, "page protection error: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

#[cold]
#[inline(never)]
pub(crate) fn maps_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Maps { msg: msg.into() }
}

#[cold]
#[inline(never)]
pub(crate) fn protect_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Protect { msg: msg.into() }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
