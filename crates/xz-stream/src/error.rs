// SPDX-License-Identifier: ISC
use std::io;

use crate::engine::ReturnCode;

/// Result type used by this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for XZ stream operations.
///
/// Data errors (`Format`, `CorruptData`, `Io`) are recoverable from the
/// caller's point of view: any bytes produced before the failure are still
/// reported. The remaining variants are fatal, see [`Error::is_fatal`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input does not start with the XZ container magic.
    #[error("invalid XZ magic number")]
    Format,
    /// Compressed data is truncated or malformed.
    #[error("corrupt xz data")]
    CorruptData,
    /// The codec rejected the requested (or encoded) options.
    #[error("unsupported xz codec options")]
    UnsupportedOptions,
    /// The requested integrity check is not supported by the codec build.
    #[error("unsupported xz integrity check")]
    UnsupportedCheck,
    /// A memory ceiling was hit or an allocation failed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(Exhaustion),
    /// The underlying source or sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The stream was already closed.
    #[error("stream already closed")]
    AlreadyClosed,
    /// An earlier failure left the stream unusable.
    #[error("stream is unusable after an earlier failure")]
    Poisoned,
    /// The codec engine reported a code with no recovery path.
    #[error("codec engine failed with {0:?}")]
    Engine(ReturnCode),
}

/// Which resource ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhaustion {
    /// Buffer or codec allocation failed.
    Allocation,
    /// Decoding would exceed the configured memory limit.
    MemLimit,
}

impl core::fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Allocation => f.write_str("memory allocation failed"),
            Self::MemLimit => f.write_str("memory usage limit reached"),
        }
    }
}

impl Error {
    /// Returns `true` for failures after which internal invariants can no
    /// longer be trusted: resource exhaustion, misuse, codec init failures
    /// and unknown engine codes.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Format | Self::CorruptData | Self::Io(_) => false,
            Self::UnsupportedOptions
            | Self::UnsupportedCheck
            | Self::ResourceExhausted(_)
            | Self::AlreadyClosed
            | Self::Poisoned
            | Self::Engine(_) => true,
        }
    }

    /// Translates a failing engine return code.
    ///
    /// `DataError` and `BufError` both mean corrupt input here. `BufError`
    /// can also mean the engine wanted more output space, which the stream
    /// adapters never withhold, so it is folded into `CorruptData`. Success
    /// codes never reach this and are reported as `Engine(Fatal)`.
    pub(crate) fn from_code(code: ReturnCode) -> Self {
        match code {
            ReturnCode::FormatError => Self::Format,
            ReturnCode::DataError | ReturnCode::BufError => Self::CorruptData,
            ReturnCode::MemError => Self::ResourceExhausted(Exhaustion::Allocation),
            ReturnCode::MemLimitError => Self::ResourceExhausted(Exhaustion::MemLimit),
            ReturnCode::OptionsError => Self::UnsupportedOptions,
            ReturnCode::UnsupportedCheck => Self::UnsupportedCheck,
            ReturnCode::Ok | ReturnCode::StreamEnd | ReturnCode::Fatal => {
                Self::Engine(ReturnCode::Fatal)
            }
        }
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        let kind = match value {
            Error::Io(err) => return err,
            Error::Format | Error::CorruptData => io::ErrorKind::InvalidData,
            Error::UnsupportedOptions | Error::UnsupportedCheck => io::ErrorKind::InvalidInput,
            Error::ResourceExhausted(_) => io::ErrorKind::OutOfMemory,
            Error::AlreadyClosed | Error::Poisoned | Error::Engine(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, value)
    }
}

/// Byte count paired with the outcome of a stream operation.
///
/// Stream operations can fail after making partial progress; `bytes` always
/// reports that progress, whether `result` is `Ok` or `Err`.
#[derive(Debug)]
#[must_use]
pub struct Progress<T> {
    /// Bytes delivered to the caller (reads) or accepted from it (writes).
    pub bytes: usize,
    /// Outcome of the operation.
    pub result: Result<T>,
}

impl<T> Progress<T> {
    pub(crate) fn ok(bytes: usize, value: T) -> Self {
        Self { bytes, result: Ok(value) }
    }

    pub(crate) fn err(bytes: usize, err: Error) -> Self {
        Self { bytes, result: Err(err) }
    }

    /// Drops the partial count on failure.
    pub fn into_result(self) -> Result<(usize, T)> {
        self.result.map(|value| (self.bytes, value))
    }
}
