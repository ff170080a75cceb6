// SPDX-License-Identifier: ISC
//! Streaming adapters over a codec [`Engine`](crate::Engine).
//!
//! Both directions stage data through a fixed [`BUFFER_LEN`](crate::BUFFER_LEN)
//! I/O buffer and a growable scratch buffer.
mod decoder;
#[cfg(feature = "encoder")]
mod encoder;

pub use decoder::{ReadStatus, XzReader};
#[cfg(feature = "encoder")]
pub use encoder::XzWriter;

/// Lifecycle of a stream handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    /// The engine signaled stream end (decoder only).
    Finished,
    Poisoned,
    Closed,
}
