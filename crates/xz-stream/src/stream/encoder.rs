// SPDX-License-Identifier: ISC
use std::io::{self, Write};

use tracing::{debug, trace, warn};

use super::State;
use crate::scratch::{ScratchBuffer, allocate};
use crate::{
    Action, AutoClose, AutoCloser, BUFFER_LEN, Engine, EncoderOptions, Error, NoClose, Progress,
    Result, ReturnCode, Sink, XzEngine,
};

/// Writer that encodes an XZ stream into a [`Sink`].
///
/// Every [`write_encoded`](Self::write_encoded) call pushes all of its input
/// through the codec and forwards encoded bytes in [`BUFFER_LEN`] chunks.
/// The stream trailer is only written by [`close`](Self::close).
///
/// # Example
///
/// ```
/// use xz_stream::{XzWriter, decompress};
///
/// let mut writer = XzWriter::new(Vec::new()).unwrap();
/// writer.write_encoded(b"writer example").result.unwrap();
/// writer.close().unwrap();
///
/// let packed = writer.into_inner().into_inner();
/// assert_eq!(decompress(&packed).unwrap(), b"writer example");
/// ```
pub struct XzWriter<W: Sink, E: Engine = XzEngine> {
    inner: W,
    engine: E,
    out_buf: Vec<u8>,
    out_pos: usize,
    scratch: ScratchBuffer,
    state: State,
    total_in: u64,
    total_out: u64,
}

impl<W: Write> XzWriter<NoClose<W>> {
    /// Creates a level 9, CRC64 writer over a caller-owned writer;
    /// [`close`](Self::close) leaves `inner` open.
    pub fn new(inner: W) -> Result<Self> {
        Self::from_sink(NoClose(inner))
    }

    /// Like [`new`](Self::new), with explicit encoder options.
    pub fn new_with_options(inner: W, options: EncoderOptions) -> Result<Self> {
        Self::from_sink_with_options(NoClose(inner), options)
    }
}

impl<W: Sink> XzWriter<W> {
    /// Creates a level 9, CRC64 writer that takes ownership of `sink` and
    /// closes it on [`close`](Self::close).
    pub fn from_sink(sink: W) -> Result<Self> {
        Self::from_sink_with_options(sink, EncoderOptions::default())
    }

    /// Like [`from_sink`](Self::from_sink), with explicit encoder options.
    pub fn from_sink_with_options(sink: W, options: EncoderOptions) -> Result<Self> {
        Self::with_engine(sink, XzEngine::encoder(options)?)
    }
}

impl<W: Sink, E: Engine> XzWriter<W, E> {
    /// Creates a writer driving a caller-supplied encoder engine.
    pub fn with_engine(sink: W, engine: E) -> Result<Self> {
        Ok(Self {
            inner: sink,
            engine,
            out_buf: allocate(BUFFER_LEN)?,
            out_pos: 0,
            scratch: ScratchBuffer::with_len(BUFFER_LEN)?,
            state: State::Open,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Returns a shared reference to the underlying sink.
    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the underlying sink.
    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwraps the writer and returns the underlying sink.
    ///
    /// Without a prior [`close`](Self::close) the stream is left unfinished.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Uncompressed bytes consumed by the codec so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Encoded bytes written to the sink so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Returns a wrapper that closes the writer on drop.
    pub fn auto_close(self) -> AutoCloser<Self> {
        AutoCloser(self)
    }

    /// Encodes all of `buf` and forwards the encoded bytes to the sink.
    ///
    /// On success `bytes == buf.len()`. On failure `bytes` is the number of
    /// input bytes the codec consumed before the error, and the writer
    /// becomes unusable except for [`close`](Self::close).
    pub fn write_encoded(&mut self, buf: &[u8]) -> Progress<()> {
        match self.state {
            State::Open => {}
            State::Poisoned | State::Finished => return Progress::err(0, Error::Poisoned),
            State::Closed => return Progress::err(0, Error::AlreadyClosed),
        }
        if buf.is_empty() {
            return Progress::ok(0, ());
        }
        let len = buf.len();
        if let Err(err) = self.scratch.ensure(len) {
            return self.fail(0, err);
        }
        self.scratch.region_mut(len).copy_from_slice(buf);

        let mut consumed = 0usize;
        while consumed < len {
            let step = self.engine.step(
                Action::Run,
                &self.scratch.region(len)[consumed..],
                &mut self.out_buf[self.out_pos..],
            );
            consumed += step.consumed;
            self.total_in += step.consumed as u64;
            self.out_pos += step.produced;

            let ended = step.code == ReturnCode::StreamEnd;
            if !ended && step.code != ReturnCode::Ok {
                return self.fail(consumed, Error::from_code(step.code));
            }
            if consumed == len || self.out_pos == self.out_buf.len() || ended {
                if let Err(err) = self.flush_out() {
                    return self.fail(consumed, Error::Io(err));
                }
            }
            if ended && consumed < len {
                return self.fail(consumed, Error::Engine(ReturnCode::StreamEnd));
            }
        }

        Progress::ok(len, ())
    }

    /// Finishes the XZ stream, writes the remaining bytes and closes the
    /// sink.
    ///
    /// The codec session, both buffers and the sink are released even when
    /// finishing fails. A poisoned writer skips finishing and reports
    /// [`Error::Poisoned`]. Calling `close` twice returns
    /// [`Error::AlreadyClosed`].
    pub fn close(&mut self) -> Result<()> {
        let drained = match self.state {
            State::Closed => return Err(Error::AlreadyClosed),
            State::Open => self.finish_stream(),
            State::Poisoned | State::Finished => Err(Error::Poisoned),
        };
        self.state = State::Closed;
        self.engine.end();
        self.scratch.release();
        self.out_buf = Vec::new();
        self.out_pos = 0;
        let closed = self.inner.close().map_err(Error::Io);
        debug!(total_in = self.total_in, total_out = self.total_out, "closed xz writer");
        drained.and(closed)
    }

    fn finish_stream(&mut self) -> Result<()> {
        loop {
            let step = self.engine.step(Action::Finish, &[], &mut self.out_buf[self.out_pos..]);
            self.out_pos += step.produced;

            let ended = step.code == ReturnCode::StreamEnd;
            if !ended && step.code != ReturnCode::Ok {
                return Err(Error::from_code(step.code));
            }
            if ended || self.out_pos == self.out_buf.len() {
                self.flush_out()?;
            }
            if ended {
                return Ok(());
            }
        }
    }

    fn flush_out(&mut self) -> io::Result<()> {
        if self.out_pos == 0 {
            return Ok(());
        }
        self.inner.write_all(&self.out_buf[..self.out_pos])?;
        trace!(bytes = self.out_pos, "flushed encoded bytes");
        self.total_out += self.out_pos as u64;
        self.out_pos = 0;
        Ok(())
    }

    fn fail<T>(&mut self, bytes: usize, err: Error) -> Progress<T> {
        if err.is_fatal() {
            warn!(error = %err, consumed = bytes, "xz writer poisoned");
        } else {
            debug!(error = %err, consumed = bytes, "xz writer poisoned");
        }
        self.state = State::Poisoned;
        Progress::err(bytes, err)
    }
}

impl<W: Sink, E: Engine> AutoClose for XzWriter<W, E> {
    fn close_ignore_error(&mut self) {
        let _ = self.close();
    }
}

impl<W: Sink, E: Engine> Write for XzWriter<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Progress { bytes, result } = self.write_encoded(buf);
        result.map(|()| bytes).map_err(io::Error::from)
    }

    /// Flushes the sink. Bytes still held inside the codec are only emitted
    /// by [`XzWriter::close`].
    fn flush(&mut self) -> io::Result<()> {
        self.flush_out()?;
        self.inner.flush()
    }
}
