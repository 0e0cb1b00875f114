// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal control.
//
// Nearly everything here is fatal: a terminal that is half in raw mode, or
// whose size is unknown, has no safe degraded state. The variants exist so
// the binary can print a precise diagnostic before exiting, not so callers
// can recover.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while controlling the terminal.
#[derive(Debug, Error)]
pub enum TermError {
    /// Standard input is not an interactive terminal device.
    #[error("standard input is not a terminal")]
    NotATerminal,

    /// `tcgetattr` failed.
    #[error("failed to read terminal attributes: {0}")]
    QueryFailed(#[source] io::Error),

    /// `tcsetattr` failed.
    #[error("failed to apply terminal attributes: {0}")]
    ConfigureFailed(#[source] io::Error),

    /// The cursor-position report did not look like `ESC [ row ; col R`.
    ///
    /// Carries the bytes that were received (without the `R` terminator).
    #[error("malformed cursor position report: {0:?}")]
    MalformedResponse(Vec<u8>),

    /// A read failed for a reason other than a timeout.
    #[error("read from terminal failed: {0}")]
    ReadFailed(#[source] io::Error),

    /// A write failed or did not transfer every byte.
    #[error("write to terminal failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// The resolved screen has no rows or no columns.
    #[error("terminal reported an unusable screen size ({rows}x{cols})")]
    EmptyScreen {
        /// Reported row count.
        rows: u16,
        /// Reported column count.
        cols: u16,
    },
}

/// `Result` alias used across the crate.
pub type Result<T> = std::result::Result<T, TermError>;

// ─── Tests ───────────────────────────────────────────────────────────────────
