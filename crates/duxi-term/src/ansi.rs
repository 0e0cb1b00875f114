// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. This module just knows the byte-level
// encoding of the handful of VT commands the screen controller needs.
//
// Cursor positions given to `cursor_to` are 0-indexed and converted to
// 1-indexed for the terminal (ANSI standard uses 1-based coordinates).
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Push the cursor as far right and down as the screen allows.
///
/// CUF/CUD clamp at the screen edge instead of wrapping or erroring, so
/// 999 columns right and 999 rows down always lands in the bottom-right
/// cell.
#[inline]
pub fn cursor_to_bottom_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Lines ───────────────────────────────────────────────────────────────────

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Device Status Report 6: ask the terminal where the cursor is.
///
/// The terminal answers on its input side with `ESC [ row ; col R`.
pub const REQUEST_CURSOR_POSITION: &[u8] = b"\x1b[6n";

// ─── Tests ───────────────────────────────────────────────────────────────────
