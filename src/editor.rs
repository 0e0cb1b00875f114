// SPDX-License-Identifier: MIT
//
// Editor state and key dispatch.
//
// There is no text model yet. The state is just what the session loop and
// the renderer need: the screen size, whether raw mode is on, and whether
// to keep going. Every key except Ctrl+Q is echoed back to the terminal so
// the raw byte stream is visible while developing.

use std::io::{Read, Write};

use duxi_term::error::{Result, TermError};
use duxi_term::fd;
use duxi_term::input::{self, CTRL_Q, Key};
use duxi_term::terminal::Size;

/// Mutable session state, owned by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    /// Whether the terminal is currently in raw mode.
    pub raw_mode_active: bool,
    /// Screen height in rows. Non-zero once initialised.
    pub screen_rows: u16,
    /// Screen width in columns. Non-zero once initialised.
    pub screen_cols: u16,
    /// Cleared by Ctrl+Q; the loop stops when this is false.
    pub running: bool,
}

impl EditorState {
    /// Fresh state: running, no screen yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw_mode_active: false,
            screen_rows: 0,
            screen_cols: 0,
            running: true,
        }
    }

    /// Record the resolved screen size.
    ///
    /// # Errors
    ///
    /// [`TermError::EmptyScreen`] if either dimension is zero; nothing can
    /// be drawn on such a screen.
    pub fn set_screen(&mut self, size: Size) -> Result<()> {
        if !size.is_usable() {
            return Err(TermError::EmptyScreen {
                rows: size.rows,
                cols: size.cols,
            });
        }
        self.screen_rows = size.rows;
        self.screen_cols = size.cols;
        Ok(())
    }

    /// Apply one key: Ctrl+Q stops the loop, anything else is echoed.
    ///
    /// # Errors
    ///
    /// [`TermError::WriteFailed`] if the echo cannot be written.
    pub fn dispatch(&mut self, key: Key, echo: &mut impl Write) -> Result<()> {
        match key {
            Key::Char(CTRL_Q) => {
                self.running = false;
                Ok(())
            }
            other => fd::write_once(echo, &[other.byte()]).map_err(TermError::WriteFailed),
        }
    }

    /// Read one key from `input` and [`dispatch`](Self::dispatch) it.
    ///
    /// # Errors
    ///
    /// Any read error from [`input::read_key`], or a failed echo.
    pub fn process_key(&mut self, input: &mut impl Read, echo: &mut impl Write) -> Result<()> {
        let key = input::read_key(input)?;
        self.dispatch(key, echo)
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ready() -> EditorState {
        let mut state = EditorState::new();
        state.set_screen(Size { cols: 80, rows: 24 }).unwrap();
        state
    }

    // ── State ───────────────────────────────────────────────────────────

    #[test]
    fn new_state_is_running_without_screen() {
        let state = EditorState::new();
        assert!(state.running);
        assert!(!state.raw_mode_active);
        assert_eq!((state.screen_rows, state.screen_cols), (0, 0));
    }

    #[test]
    fn set_screen_records_size() {
        let state = ready();
        assert_eq!((state.screen_rows, state.screen_cols), (24, 80));
    }

    #[test]
    fn set_screen_rejects_zero_dimensions() {
        for size in [
            Size { cols: 0, rows: 24 },
            Size { cols: 80, rows: 0 },
            Size { cols: 0, rows: 0 },
        ] {
            let mut state = EditorState::new();
            assert!(matches!(
                state.set_screen(size),
                Err(TermError::EmptyScreen { .. })
            ));
            assert_eq!(state.screen_cols, 0);
        }
    }

    // ── Keys ────────────────────────────────────────────────────────────

    #[test]
    fn ctrl_q_stops_without_echo() {
        let mut state = ready();
        let mut echo = Vec::new();
        state.process_key(&mut &[0x11u8][..], &mut echo).unwrap();
        assert!(!state.running);
        assert!(echo.is_empty());
    }

    #[test]
    fn every_other_byte_is_echoed_and_keeps_running() {
        for b in (0..=u8::MAX).filter(|&b| b != CTRL_Q) {
            let mut state = ready();
            let mut echo = Vec::new();
            state.process_key(&mut &[b][..], &mut echo).unwrap();
            assert!(state.running, "byte {b:#04x} must not stop the loop");
            assert_eq!(echo, [b]);
        }
    }

    #[test]
    fn escape_is_echoed_verbatim() {
        let mut state = ready();
        let mut echo = Vec::new();
        state.dispatch(Key::Escape, &mut echo).unwrap();
        assert_eq!(echo, [0x1b]);
        assert!(state.running);
    }

    #[test]
    fn echo_failure_is_reported() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut state = ready();
        assert!(matches!(
            state.dispatch(Key::Char(b'a'), &mut Closed),
            Err(TermError::WriteFailed(_))
        ));
    }
}
