// SPDX-License-Identifier: ISC
use std::io::{self, Read};

use tracing::{debug, trace, warn};

use super::State;
use crate::scratch::{ScratchBuffer, allocate};
use crate::{
    Action, AutoClose, AutoCloser, BUFFER_LEN, DecoderOptions, Engine, Error, NoClose, Progress,
    Result, ReturnCode, Source, XzEngine,
};

/// Whether more decoded data may follow a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// The stream has not ended yet.
    More,
    /// The codec signaled the end of the XZ stream; later reads return zero
    /// bytes.
    End,
}

/// Reader that decodes an XZ stream pulled from a [`Source`].
///
/// Compressed bytes are pulled in [`BUFFER_LEN`] chunks. Decoded bytes are
/// staged in a scratch buffer sized to the caller's request, then copied out.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use xz_stream::{XzReader, compress};
///
/// let packed = compress(b"reader example").unwrap();
/// let mut reader = XzReader::new(packed.as_slice()).unwrap();
///
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out).unwrap();
/// reader.close().unwrap();
/// assert_eq!(out, b"reader example");
/// ```
pub struct XzReader<R: Source, E: Engine = XzEngine> {
    inner: R,
    engine: E,
    in_buf: Vec<u8>,
    in_pos: usize,
    in_len: usize,
    source_done: bool,
    scratch: ScratchBuffer,
    state: State,
    deferred: Option<Error>,
    total_in: u64,
    total_out: u64,
}

impl<R: Read> XzReader<NoClose<R>> {
    /// Creates a reader over a caller-owned reader; [`close`](Self::close)
    /// leaves `inner` open.
    pub fn new(inner: R) -> Result<Self> {
        Self::from_source(NoClose(inner))
    }

    /// Like [`new`](Self::new), with explicit decoder options.
    pub fn new_with_options(inner: R, options: DecoderOptions) -> Result<Self> {
        Self::from_source_with_options(NoClose(inner), options)
    }
}

impl<R: Source> XzReader<R> {
    /// Creates a reader that takes ownership of `source` and closes it on
    /// [`close`](Self::close).
    pub fn from_source(source: R) -> Result<Self> {
        Self::from_source_with_options(source, DecoderOptions::default())
    }

    /// Like [`from_source`](Self::from_source), with explicit decoder options.
    pub fn from_source_with_options(source: R, options: DecoderOptions) -> Result<Self> {
        Self::with_engine(source, XzEngine::decoder(options)?)
    }
}

impl<R: Source, E: Engine> XzReader<R, E> {
    /// Creates a reader driving a caller-supplied decoder engine.
    pub fn with_engine(source: R, engine: E) -> Result<Self> {
        Ok(Self {
            inner: source,
            engine,
            in_buf: allocate(BUFFER_LEN)?,
            in_pos: 0,
            in_len: 0,
            source_done: false,
            scratch: ScratchBuffer::with_len(BUFFER_LEN)?,
            state: State::Open,
            deferred: None,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Returns a shared reference to the underlying source.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns a mutable reference to the underlying source.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwraps the reader and returns the underlying source without closing
    /// it.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Returns a wrapper that closes the reader (and its source) on drop.
    pub fn auto_close(self) -> AutoCloser<Self> {
        AutoCloser(self)
    }

    /// Compressed bytes consumed by the codec so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decoded bytes handed to the caller so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Fills `buf` with decoded bytes.
    ///
    /// Returns once `buf` is full or the stream ended. On failure,
    /// `bytes` still counts the decoded prefix written into `buf`:
    ///
    /// - [`Error::Format`]: the source is not an XZ stream.
    /// - [`Error::CorruptData`]: truncated or malformed data.
    /// - [`Error::Io`]: the source failed; the read can be retried.
    /// - [`Error::ResourceExhausted`]: memory limit or allocation failure.
    ///
    /// Every error except [`Error::Io`] leaves the reader unusable.
    pub fn read_decoded(&mut self, buf: &mut [u8]) -> Progress<ReadStatus> {
        match self.state {
            State::Open => {}
            State::Finished => return Progress::ok(0, ReadStatus::End),
            State::Poisoned => return Progress::err(0, Error::Poisoned),
            State::Closed => return Progress::err(0, Error::AlreadyClosed),
        }
        if buf.is_empty() {
            return Progress::ok(0, ReadStatus::More);
        }
        if let Err(err) = self.scratch.ensure(buf.len()) {
            return self.fail(0, err);
        }

        let want = buf.len();
        let mut produced = 0usize;
        loop {
            let mut action = Action::Run;
            if self.in_pos == self.in_len {
                if !self.source_done {
                    match self.pull() {
                        Ok(0) => self.source_done = true,
                        Ok(_) => {}
                        Err(err) => {
                            self.deliver(buf, produced);
                            return Progress::err(produced, Error::Io(err));
                        }
                    }
                }
                if self.source_done {
                    action = Action::Finish;
                }
            }

            let step = self.engine.step(
                action,
                &self.in_buf[self.in_pos..self.in_len],
                &mut self.scratch.region_mut(want)[produced..],
            );
            self.in_pos += step.consumed;
            self.total_in += step.consumed as u64;
            produced += step.produced;

            match step.code {
                ReturnCode::StreamEnd => {
                    self.deliver(buf, produced);
                    self.state = State::Finished;
                    debug!(total_in = self.total_in, total_out = self.total_out, "xz stream end");
                    return Progress::ok(produced, ReadStatus::End);
                }
                ReturnCode::Ok if produced == want => {
                    self.deliver(buf, produced);
                    return Progress::ok(produced, ReadStatus::More);
                }
                ReturnCode::Ok => {}
                code => {
                    self.deliver(buf, produced);
                    return self.fail(produced, Error::from_code(code));
                }
            }
        }
    }

    /// Ends the codec session, releases buffers and closes the source.
    ///
    /// Returns [`Error::AlreadyClosed`] when called a second time.
    pub fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Err(Error::AlreadyClosed);
        }
        self.state = State::Closed;
        self.engine.end();
        self.scratch.release();
        self.in_buf = Vec::new();
        self.in_pos = 0;
        self.in_len = 0;
        self.deferred = None;
        debug!(total_in = self.total_in, total_out = self.total_out, "closed xz reader");
        self.inner.close().map_err(Error::Io)
    }

    fn pull(&mut self) -> io::Result<usize> {
        loop {
            match self.inner.read(&mut self.in_buf) {
                Ok(n) => {
                    trace!(bytes = n, "pulled compressed bytes");
                    self.in_pos = 0;
                    self.in_len = n;
                    return Ok(n);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn deliver(&mut self, buf: &mut [u8], produced: usize) {
        buf[..produced].copy_from_slice(self.scratch.region(produced));
        self.total_out += produced as u64;
    }

    fn fail<T>(&mut self, bytes: usize, err: Error) -> Progress<T> {
        if err.is_fatal() {
            warn!(error = %err, decoded = bytes, "xz reader poisoned");
        } else {
            debug!(error = %err, decoded = bytes, "xz reader poisoned");
        }
        self.state = State::Poisoned;
        Progress::err(bytes, err)
    }
}

impl<R: Source, E: Engine> AutoClose for XzReader<R, E> {
    fn close_ignore_error(&mut self) {
        let _ = self.close();
    }
}

/// Errors that arrive together with decoded bytes are reported by the next
/// `read` call.
impl<R: Source, E: Engine> Read for XzReader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = self.deferred.take() {
            return Err(err.into());
        }
        let Progress { bytes, result } = self.read_decoded(buf);
        match result {
            Ok(_) => Ok(bytes),
            Err(err) if bytes > 0 => {
                self.deferred = Some(err);
                Ok(bytes)
            }
            Err(err) => Err(err.into()),
        }
    }
}
