// SPDX-License-Identifier: MIT
//
// Screen geometry discovery.
//
// The fast path asks the kernel (`TIOCGWINSZ`). Some terminals (serial
// lines, certain emulators behind multiplexers) answer with zero columns or
// not at all, so the fallback measures the screen with the cursor itself:
//
//   1. DSR 6 → where is the cursor now?         (remember it)
//   2. CUF 999, CUD 999 → shove it bottom-right (clamps at the edge)
//   3. DSR 6 → where is it now?                 (that's the size)
//   4. CUP back to where it was
//
// The cursor report is read one byte at a time on a dedicated path, apart
// from the key reader, and parsed straight from `&[u8]`.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::fd;
use crate::output::OutputBuffer;
use crate::terminal::{Size, Tty};

/// Bytes of a cursor report kept before giving up on seeing `R`.
///
/// `ESC [ 65535 ; 65535` is 13 bytes, so 31 leaves ample room for noise.
pub const CURSOR_REPORT_CAPACITY: usize = 31;

/// Consecutive empty reads tolerated while waiting for the cursor report.
///
/// With the default 1-decisecond read timeout this is about one second.
pub const PROBE_IDLE_LIMIT: usize = 10;

/// Resolve the screen size: kernel first, cursor probe as fallback.
///
/// The kernel answer is used whenever it reports a non-zero column count.
///
/// # Errors
///
/// Any error from the probe. These are fatal to the caller: nothing can be
/// rendered without a size.
pub fn window_size(
    tty: &impl Tty,
    input: &mut impl Read,
    output: &mut impl Write,
) -> Result<Size> {
    match tty.window_size() {
        Ok(size) if size.cols != 0 => {
            debug!(rows = size.rows, cols = size.cols, "window size from kernel");
            return Ok(size);
        }
        Ok(_) => debug!("kernel reported zero columns, probing cursor"),
        Err(e) => debug!("window size query failed ({e}), probing cursor"),
    }

    probe_window_size(input, output)
}

/// Measure the screen by moving the cursor to the bottom-right corner.
///
/// The final cursor restore is best-effort: a failed write there is logged
/// and the measured size is still returned.
///
/// # Errors
///
/// [`TermError::WriteFailed`] if a probe request cannot be written, or any
/// error from [`cursor_position`].
pub fn probe_window_size(input: &mut impl Read, output: &mut impl Write) -> Result<Size> {
    let (orig_row, orig_col) = cursor_position(input, output)?;

    let mut seq = OutputBuffer::new();
    ansi::cursor_to_bottom_right(&mut seq).map_err(TermError::WriteFailed)?;
    seq.write_to(output).map_err(TermError::WriteFailed)?;

    let (rows, cols) = cursor_position(input, output)?;
    debug!(rows, cols, "window size from cursor probe");

    // Reported positions are 1-based; cursor_to takes 0-based.
    let mut seq = OutputBuffer::new();
    let restored = ansi::cursor_to(
        &mut seq,
        orig_col.saturating_sub(1),
        orig_row.saturating_sub(1),
    )
    .and_then(|()| seq.write_to(output));
    if let Err(e) = restored {
        warn!(row = orig_row, col = orig_col, "failed to restore cursor after probe: {e}");
    }

    Ok(Size { cols, rows })
}

/// Ask the terminal for the cursor position, 1-based `(row, col)`.
///
/// Writes DSR 6, then reads the reply byte by byte until `R`, until
/// [`CURSOR_REPORT_CAPACITY`] bytes are held, or until
/// [`PROBE_IDLE_LIMIT`] reads in a row come back empty. Bytes after `R`
/// are left unread.
///
/// # Errors
///
/// - [`TermError::WriteFailed`] if the request is not fully written.
/// - [`TermError::ReadFailed`] on a read error other than a timeout.
/// - [`TermError::MalformedResponse`] if the reply is not `ESC [ row ; col`.
pub fn cursor_position(input: &mut impl Read, output: &mut impl Write) -> Result<(u16, u16)> {
    fd::write_once(output, ansi::REQUEST_CURSOR_POSITION).map_err(TermError::WriteFailed)?;
    let reply = read_cursor_report(input)?;
    parse_cursor_report(&reply)
}

/// Collect the reply up to (not including) the `R` terminator.
fn read_cursor_report(input: &mut impl Read) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(CURSOR_REPORT_CAPACITY);
    let mut idle = 0;

    while reply.len() < CURSOR_REPORT_CAPACITY {
        let mut byte = [0u8; 1];
        match input.read(&mut byte) {
            Ok(0) => {}
            Ok(_) if byte[0] == b'R' => break,
            Ok(_) => {
                reply.push(byte[0]);
                idle = 0;
                continue;
            }
            Err(e) if fd::is_retryable(&e) => {}
            Err(e) => return Err(TermError::ReadFailed(e)),
        }

        idle += 1;
        if idle >= PROBE_IDLE_LIMIT {
            debug!(received = reply.len(), "cursor report timed out");
            break;
        }
    }

    Ok(reply)
}

/// Parse `ESC [ row ; col`, ignoring anything after the column digits.
///
/// # Errors
///
/// [`TermError::MalformedResponse`] if the prefix is missing, either number
/// is absent, the separator is not `;`, or a number overflows `u16`.
pub fn parse_cursor_report(reply: &[u8]) -> Result<(u16, u16)> {
    let malformed = || TermError::MalformedResponse(reply.to_vec());

    let rest = reply.strip_prefix(b"\x1b[").ok_or_else(malformed)?;
    let (row, rest) = parse_u16_from(rest).ok_or_else(malformed)?;
    let rest = rest.strip_prefix(b";").ok_or_else(malformed)?;
    let (col, _) = parse_u16_from(rest).ok_or_else(malformed)?;

    Ok((row, col))
}

/// Parse a decimal u16 from the start of a byte slice.
///
/// Returns `(value, remaining_bytes)`, or `None` if there is no leading
/// digit or the value does not fit.
fn parse_u16_from(buf: &[u8]) -> Option<(u16, &[u8])> {
    let digits = buf.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let mut val: u16 = 0;
    for &b in &buf[..digits] {
        val = val.checked_mul(10)?.checked_add(u16::from(b - b'0'))?;
    }
    Some((val, &buf[digits..]))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
