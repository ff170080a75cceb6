// SPDX-License-Identifier: ISC
//! Codec engine contract and the liblzma-backed implementation.
//!
//! Stream adapters only talk to the [`Engine`] trait: one `step` call moves
//! bytes from an input region to an output region and reports how far it got.

use tracing::{debug, trace};
use xz2::stream::{Action as XzAction, Check, Error as XzError, Status, Stream};

use crate::{DEFAULT_LEVEL, Error, MEM_LIMIT, Result};

/// What the engine should do with the input it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Process input; more will follow.
    Run,
    /// No more input will arrive; flush all internal state.
    Finish,
}

/// Outcome code of a single engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    /// Progress was made (or is possible with more input/output).
    Ok,
    /// The logical stream is complete.
    StreamEnd,
    /// Input is not in the expected container format.
    FormatError,
    /// Compressed data is corrupt.
    DataError,
    /// No progress is possible.
    BufError,
    /// The engine could not allocate memory.
    MemError,
    /// Decoding needs more memory than the configured limit.
    MemLimitError,
    /// Unsupported options.
    OptionsError,
    /// Unsupported integrity check.
    UnsupportedCheck,
    /// Programming error or unknown code inside the engine.
    Fatal,
}

/// Result of one [`Engine::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Engine return code.
    pub code: ReturnCode,
    /// Bytes taken from the front of the input region.
    pub consumed: usize,
    /// Bytes written to the front of the output region.
    pub produced: usize,
}

/// A stateful, chunked transform.
///
/// Implementations must never consume more than `input.len()` bytes or write
/// past `output.len()`.
pub trait Engine {
    /// Runs the transform once over `input`, writing into `output`.
    fn step(&mut self, action: Action, input: &[u8], output: &mut [u8]) -> Step;

    /// Releases engine-internal resources. Calling it again is a no-op, and
    /// any later `step` reports [`ReturnCode::Fatal`].
    fn end(&mut self);
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    #[inline]
    fn step(&mut self, action: Action, input: &[u8], output: &mut [u8]) -> Step {
        (**self).step(action, input, output)
    }

    #[inline]
    fn end(&mut self) {
        (**self).end()
    }
}

/// Integrity check stored in each XZ block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// No check.
    None,
    /// CRC32.
    Crc32,
    /// CRC64.
    #[default]
    Crc64,
    /// SHA-256.
    Sha256,
}

impl From<IntegrityCheck> for Check {
    fn from(value: IntegrityCheck) -> Self {
        match value {
            IntegrityCheck::None => Check::None,
            IntegrityCheck::Crc32 => Check::Crc32,
            IntegrityCheck::Crc64 => Check::Crc64,
            IntegrityCheck::Sha256 => Check::Sha256,
        }
    }
}

/// Decoder session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Memory ceiling in bytes; decoding a stream that needs more fails with
    /// [`Error::ResourceExhausted`].
    pub mem_limit: u64,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { mem_limit: MEM_LIMIT }
    }
}

/// Encoder session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Preset level (`0..=9`).
    pub level: u32,
    /// Integrity check written into each block.
    pub check: IntegrityCheck,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self { level: DEFAULT_LEVEL, check: IntegrityCheck::Crc64 }
    }
}

/// [`Engine`] backed by liblzma through `xz2`.
pub struct XzEngine {
    stream: Option<Stream>,
}

impl XzEngine {
    /// Opens an XZ stream decoder session.
    pub fn decoder(options: DecoderOptions) -> Result<Self> {
        let stream = Stream::new_stream_decoder(options.mem_limit, 0)
            .map_err(|err| Error::from_code(code_of(Err(err))))?;
        debug!(mem_limit = options.mem_limit, "opened xz decoder session");
        Ok(Self { stream: Some(stream) })
    }

    /// Opens an XZ stream encoder session.
    ///
    /// Levels above 9 are rejected with [`Error::UnsupportedOptions`].
    pub fn encoder(options: EncoderOptions) -> Result<Self> {
        if options.level > 9 {
            return Err(Error::UnsupportedOptions);
        }
        let stream = Stream::new_easy_encoder(options.level, options.check.into())
            .map_err(|err| Error::from_code(code_of(Err(err))))?;
        debug!(level = options.level, check = ?options.check, "opened xz encoder session");
        Ok(Self { stream: Some(stream) })
    }

    /// Returns `true` until [`Engine::end`] has been called.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

impl Engine for XzEngine {
    fn step(&mut self, action: Action, input: &[u8], output: &mut [u8]) -> Step {
        let Some(stream) = self.stream.as_mut() else {
            return Step { code: ReturnCode::Fatal, consumed: 0, produced: 0 };
        };

        let before_in = stream.total_in();
        let before_out = stream.total_out();
        let action = match action {
            Action::Run => XzAction::Run,
            Action::Finish => XzAction::Finish,
        };
        let result = stream.process(input, output, action);

        Step {
            code: code_of(result),
            consumed: (stream.total_in() - before_in) as usize,
            produced: (stream.total_out() - before_out) as usize,
        }
    }

    fn end(&mut self) {
        if let Some(stream) = self.stream.take() {
            trace!(total_in = stream.total_in(), total_out = stream.total_out(), "ended xz session");
        }
    }
}

fn code_of(result: core::result::Result<Status, XzError>) -> ReturnCode {
    match result {
        Ok(Status::Ok) | Ok(Status::GetCheck) => ReturnCode::Ok,
        Ok(Status::StreamEnd) => ReturnCode::StreamEnd,
        // liblzma's LZMA_BUF_ERROR surfaces as `MemNeeded` in xz2.
        Ok(Status::MemNeeded) => ReturnCode::BufError,
        // Only reported when a decoder asks for it; informational.
        Err(XzError::NoCheck) => ReturnCode::Ok,
        Err(XzError::Format) => ReturnCode::FormatError,
        Err(XzError::Data) => ReturnCode::DataError,
        Err(XzError::Mem) => ReturnCode::MemError,
        Err(XzError::MemLimit) => ReturnCode::MemLimitError,
        Err(XzError::Options) => ReturnCode::OptionsError,
        Err(XzError::UnsupportedCheck) => ReturnCode::UnsupportedCheck,
        Err(XzError::Program) => ReturnCode::Fatal,
    }
}
