// SPDX-License-Identifier: MIT
//
// Raw file-descriptor I/O.
//
// Rust's `io::stdout()` is line-buffered: a frame full of `\r\n` pairs
// would be split into one write per line. These wrappers issue exactly one
// `read(2)` / `write(2)` per call, so a frame assembled in an
// `OutputBuffer` reaches the terminal in a single syscall and a one-byte
// read means a one-byte read.
//
// Safety: `libc::read` / `libc::write` on a caller-supplied fd. The buffers
// are Rust slices, so pointer and length always agree.
#![allow(unsafe_code)]

use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;

/// Unbuffered reader over a raw file descriptor.
#[derive(Debug, Clone, Copy)]
pub struct FdReader(RawFd);

impl FdReader {
    /// Reader over standard input.
    #[must_use]
    pub const fn stdin() -> Self {
        Self(libc::STDIN_FILENO)
    }
}

impl Read for FdReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.0, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }
}

/// Unbuffered writer over a raw file descriptor.
#[derive(Debug, Clone, Copy)]
pub struct FdWriter(RawFd);

impl FdWriter {
    /// Writer over standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self(libc::STDOUT_FILENO)
    }

    /// Writer over standard input.
    ///
    /// A terminal fd is bidirectional; writing to stdin's fd displays the
    /// bytes just like stdout would.
    #[must_use]
    pub const fn stdin() -> Self {
        Self(libc::STDIN_FILENO)
    }
}

impl Write for FdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.0, buf.as_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing is buffered on our side.
        Ok(())
    }
}

/// Whether a read error just means "no byte yet, try again".
///
/// `EAGAIN` shows up on non-blocking fds, `EINTR` when a signal lands
/// mid-read. Anything else is a real failure.
#[must_use]
pub fn is_retryable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Write `bytes` with exactly one `write` call.
///
/// A short write is an error: escape sequences cut in half leave the
/// terminal parser in an unknown state.
///
/// # Errors
///
/// Returns the writer's error, or `WriteZero` if fewer than `bytes.len()`
/// bytes were accepted.
pub fn write_once(w: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    let n = w.write(bytes)?;
    if n == bytes.len() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {n} of {} bytes", bytes.len()),
        ))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts at most `limit` bytes per call.
    struct Stingy {
        limit: usize,
        got: Vec<u8>,
        calls: usize,
    }

    impl Write for Stingy {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            let n = buf.len().min(self.limit);
            self.got.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_once_full_write() {
        let mut w = Stingy { limit: 64, got: Vec::new(), calls: 0 };
        write_once(&mut w, b"\x1b[6n").unwrap();
        assert_eq!(w.got, b"\x1b[6n");
        assert_eq!(w.calls, 1);
    }

    #[test]
    fn write_once_short_write_is_error() {
        let mut w = Stingy { limit: 2, got: Vec::new(), calls: 0 };
        let err = write_once(&mut w, b"\x1b[6n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(w.calls, 1, "must not retry the remainder");
    }

    #[test]
    fn retryable_kinds() {
        assert!(is_retryable(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_retryable(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_retryable(&io::Error::from_raw_os_error(libc::EAGAIN)));
        assert!(!is_retryable(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(!is_retryable(&io::Error::from_raw_os_error(libc::EIO)));
    }

    #[test]
    fn fd_writer_to_dev_null() {
        use std::os::unix::io::AsRawFd;
        let null = std::fs::OpenOptions::new().write(true).open("/dev/null").unwrap();
        let mut w = FdWriter(null.as_raw_fd());
        assert_eq!(w.write(b"hello").unwrap(), 5);
    }

    #[test]
    fn fd_reader_eof_reads_zero() {
        use std::os::unix::io::AsRawFd;
        let null = std::fs::File::open("/dev/null").unwrap();
        let mut r = FdReader(null.as_raw_fd());
        let mut buf = [0u8; 1];
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn fd_reader_bad_fd_errors() {
        let mut r = FdReader(-1);
        let mut buf = [0u8; 1];
        assert!(r.read(&mut buf).is_err());
    }
}
