// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// OutputBuffer accumulates all bytes of one frame in memory so the entire
// frame can be written in a single write() syscall. Many small writes
// (cursor hide, each row, each erase) let the terminal repaint between
// them, which shows up as flicker and tearing.
//
// The buffer is append-only and owned by one render pass: build it, hand it
// to `write_to`, and it is gone.

use std::io::{self, Write};

use crate::fd;

/// An append-only byte buffer holding one frame.
///
/// Default capacity: 4 KB, enough for an 80×24 placeholder screen without
/// reallocation.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 4096;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Append a whole segment.
    ///
    /// Either every byte of `bytes` lands in the buffer or (on allocation
    /// failure) the process aborts; a segment is never partially appended.
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write the whole frame to `w` with one `write` call and release it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or is short.
    pub fn write_to(self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        fd::write_once(w, &self.buf)
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real output goes through write_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
