// SPDX-License-Identifier: ISC
//! Streaming XZ compression and decompression over liblzma.
//!
//! # Overview
//!
//! This crate provides:
//!
//! - `XzReader`: pulls an XZ stream from a byte source and yields decoded
//!   bytes.
//! - `XzWriter`: accepts bytes and pushes an XZ stream into a byte sink.
//! - One-shot helpers (`compress`/`decompress`) built on the streams.
//! - The `Engine` trait the streams drive, with `XzEngine` as the liblzma
//!   implementation.
//!
//! Streams take ownership of a `Source`/`Sink`, which is closed together with
//! the stream. Plain `std::io` readers and writers are wrapped in `NoClose`,
//! so closing the stream leaves them to the caller.
//!
//! # Features
//!
//! - `encoder` (default): enables `XzWriter` and the compression helpers.
//!
//! # Examples
//!
//! ```
//! use std::io::{Read, Write};
//! use xz_stream::{XzReader, XzWriter};
//!
//! let mut writer = XzWriter::new(Vec::new()).unwrap();
//! writer.write_all(b"stream stream stream").unwrap();
//! writer.close().unwrap();
//! let packed = writer.into_inner().into_inner();
//!
//! let mut reader = XzReader::new(packed.as_slice()).unwrap();
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap();
//! assert_eq!(out, b"stream stream stream");
//! ```
//!
//! # Errors
//!
//! Data errors (`Error::Format`, `Error::CorruptData`, `Error::Io`) are
//! reported together with the partial byte count in `Progress`. Resource
//! exhaustion and misuse such as closing twice are reported as errors for
//! which `Error::is_fatal` returns `true`; nothing in this crate panics on
//! them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod engine;
mod error;
mod io;
mod oneshot;
mod scratch;
mod stream;

/// Codec engine contract and the liblzma implementation.
pub use engine::{
    Action, DecoderOptions, Engine, EncoderOptions, IntegrityCheck, ReturnCode, Step, XzEngine,
};
/// Crate error and result types.
pub use error::{Error, Exhaustion, Progress, Result};
/// Source/sink traits and the non-closing wrapper.
pub use io::{NoClose, Sink, Source};
/// Decodes a complete XZ stream held in memory.
pub use oneshot::decompress;
#[cfg(feature = "encoder")]
#[cfg_attr(docsrs, doc(cfg(feature = "encoder")))]
/// Encodes bytes into a complete XZ stream.
pub use oneshot::{compress, compress_with_options};
/// XZ stream reader.
pub use stream::{ReadStatus, XzReader};
#[cfg(feature = "encoder")]
#[cfg_attr(docsrs, doc(cfg(feature = "encoder")))]
/// XZ stream writer.
pub use stream::XzWriter;

/// Size of the fixed buffer used to talk to the underlying source or sink.
pub const BUFFER_LEN: usize = 4096;

/// Default decoder memory limit (256 MiB).
pub const MEM_LIMIT: u64 = 256 * 1024 * 1024;

/// Default encoder preset level.
pub const DEFAULT_LEVEL: u32 = 9;

/// Magic bytes that open every XZ stream.
pub const XZ_MAGIC: [u8; 6] = [0xFD, b'7', b'z', b'X', b'Z', 0x00];

/// Internal trait used by [`AutoCloser`] to close streams on drop.
#[doc(hidden)]
pub trait AutoClose {
    /// Closes the wrapped stream and ignores any returned error.
    fn close_ignore_error(&mut self);
}

/// Wrapper that closes the wrapped stream on drop.
///
/// Useful for best-effort finalization in scopes with early returns. An
/// explicit `close()` through the wrapper is fine; the second close on drop
/// is ignored.
pub struct AutoCloser<T: AutoClose>(pub(crate) T);

impl<T: AutoClose> Drop for AutoCloser<T> {
    fn drop(&mut self) {
        self.0.close_ignore_error();
    }
}

impl<T: AutoClose> core::ops::Deref for AutoCloser<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: AutoClose> core::ops::DerefMut for AutoCloser<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: AutoClose + std::io::Read> std::io::Read for AutoCloser<T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        std::io::Read::read(&mut self.0, buf)
    }
}

impl<T: AutoClose + std::io::Write> std::io::Write for AutoCloser<T> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write(&mut self.0, buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::Write::flush(&mut self.0)
    }
}
