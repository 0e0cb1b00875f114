// SPDX-License-Identifier: MIT
//
// Terminal key input.
//
// One byte in, one key out. With VMIN=0/VTIME=1 a `read()` returns after
// a decisecond even when nothing was typed, so `read_key` simply spins on
// empty reads until a byte shows up. No multi-byte decoding happens here:
// a lone ESC is reported as `Key::Escape` and whatever follows it arrives
// as ordinary keys on later calls.

use std::io::Read;

use crate::error::{Result, TermError};
use crate::fd;

/// The escape byte.
pub const ESC: u8 = 0x1b;

/// The byte a terminal sends for Ctrl+`k`.
#[inline]
#[must_use]
pub const fn ctrl_key(k: u8) -> u8 {
    k & 0x1f
}

/// Ctrl+Q.
pub const CTRL_Q: u8 = ctrl_key(b'q');

/// A key read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The escape byte on its own.
    Escape,
    /// Any other byte, passed through as-is.
    Char(u8),
}

impl Key {
    /// Classify a raw byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        match b {
            ESC => Self::Escape,
            other => Self::Char(other),
        }
    }

    /// The byte this key was read as.
    #[inline]
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Escape => ESC,
            Self::Char(b) => b,
        }
    }
}

/// Block until one byte arrives and return it as a [`Key`].
///
/// Empty reads (the raw-mode timeout), `EAGAIN` and `EINTR` are retried.
///
/// # Errors
///
/// [`TermError::ReadFailed`] on any other read error.
pub fn read_key(input: &mut impl Read) -> Result<Key> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => {}
            Ok(_) => return Ok(Key::from_byte(byte[0])),
            Err(e) if fd::is_retryable(&e) => {}
            Err(e) => return Err(TermError::ReadFailed(e)),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
