// SPDX-License-Identifier: MIT
//
// Frame rendering.
//
// One frame = one OutputBuffer = one write():
//
//   hide cursor, home
//   for each row: "~" or the welcome banner, erase to EOL, "\r\n" (not last)
//   home, show cursor
//
// The banner sits a third of the way down, centred, and is cut to the
// screen width rather than wrapped.

use std::io::{self, Write};

use duxi_term::ansi;
use duxi_term::error::{Result, TermError};
use duxi_term::output::OutputBuffer;

use crate::editor::EditorState;

/// The welcome line, `Duxi editor -- version x.y.z`.
#[must_use]
pub fn banner() -> String {
    format!("Duxi editor -- version {}", env!("CARGO_PKG_VERSION"))
}

/// Build and write one frame with a single `write` call.
///
/// # Errors
///
/// [`TermError::WriteFailed`] if the frame is not written in full.
pub fn render_frame(state: &EditorState, out: &mut impl Write) -> Result<()> {
    build_frame(state, banner().as_bytes())
        .and_then(|frame| frame.write_to(out))
        .map_err(TermError::WriteFailed)
}

/// Assemble a frame for `state` with `banner` as the welcome line.
///
/// # Errors
///
/// Never in practice: every segment goes into an in-memory buffer.
pub fn build_frame(state: &EditorState, banner: &[u8]) -> io::Result<OutputBuffer> {
    let mut buf = OutputBuffer::new();

    ansi::cursor_hide(&mut buf)?;
    ansi::cursor_home(&mut buf)?;

    draw_rows(&mut buf, state, banner)?;

    ansi::cursor_home(&mut buf)?;
    ansi::cursor_show(&mut buf)?;

    Ok(buf)
}

fn draw_rows(buf: &mut OutputBuffer, state: &EditorState, banner: &[u8]) -> io::Result<()> {
    let rows = state.screen_rows;
    for y in 0..rows {
        if y == rows / 3 {
            draw_welcome(buf, usize::from(state.screen_cols), banner);
        } else {
            buf.append(b"~");
        }

        ansi::erase_line(buf)?;
        if y + 1 < rows {
            buf.append(b"\r\n");
        }
    }
    Ok(())
}

/// Centre `banner` in `cols`, or cut it to `cols` bytes if it doesn't fit.
fn draw_welcome(buf: &mut OutputBuffer, cols: usize, banner: &[u8]) {
    if banner.len() > cols {
        buf.append(&banner[..cols]);
        return;
    }

    let padding = (cols - banner.len()) / 2;
    buf.append(&b" ".repeat(padding));
    buf.append(banner);
}
