// SPDX-License-Identifier: ISC
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

/// Byte source with an explicit release operation.
///
/// [`XzReader`](crate::XzReader) owns its source and calls `close` exactly
/// once, from [`XzReader::close`](crate::XzReader::close).
pub trait Source: Read {
    /// Releases the underlying resource.
    fn close(&mut self) -> io::Result<()>;
}

/// Byte sink with an explicit release operation.
///
/// [`XzWriter`](crate::XzWriter) calls `close` exactly once, after the final
/// encoded bytes were written.
pub trait Sink: Write {
    /// Releases the underlying resource.
    fn close(&mut self) -> io::Result<()>;
}

/// Wrapper whose `close` does nothing.
///
/// Used for plain readers and writers whose lifetime the caller keeps
/// managing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoClose<T>(pub T);

impl<T> NoClose<T> {
    /// Returns a shared reference to the wrapped value.
    pub fn get_ref(&self) -> &T {
        &self.0
    }

    /// Returns a mutable reference to the wrapped value.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.0
    }

    /// Unwraps the value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<R: Read> Read for NoClose<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<W: Write> Write for NoClose<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<R: Read> Source for NoClose<R> {
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Sink for NoClose<W> {
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl Source for File {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Syncs file contents to disk.
impl Sink for File {
    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

impl<W: Write> Sink for BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}
