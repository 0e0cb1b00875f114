// SPDX-License-Identifier: MIT
//
// Session loop: initialise → (render, read key, dispatch)* → terminate.
//
// The raw-mode guard lives in this function's scope. Whatever ends the
// session (Ctrl+Q, a failed probe, a read error) the guard is dropped on
// the way out and the terminal is restored before `main` decides on an
// exit status.

use std::io::{Read, Write};

use duxi_term::error::Result;
use duxi_term::geometry;
use duxi_term::terminal::{self, RawModeConfig, Tty};
use tracing::{debug, info};

use crate::editor::EditorState;
use crate::render;

/// The three byte streams a session talks to.
pub struct Streams<I, O, E> {
    /// Key and cursor-report bytes.
    pub input: I,
    /// Frames and probe requests.
    pub output: O,
    /// Where non-quit keys are echoed.
    pub echo: E,
}

/// Run one session to completion and return the final state.
///
/// # Errors
///
/// Any terminal error. The terminal has already been restored when this
/// returns, on success and on failure.
pub fn run<T, I, O, E>(
    tty: &T,
    config: &RawModeConfig,
    streams: &mut Streams<I, O, E>,
) -> Result<EditorState>
where
    T: Tty,
    I: Read,
    O: Write,
    E: Write,
{
    // ── Initializing ─────────────────────────────────────────────
    let mut state = EditorState::new();
    let mut raw = terminal::enter_raw_mode(tty, config)?;
    state.raw_mode_active = true;

    let size = geometry::window_size(tty, &mut streams.input, &mut streams.output)?;
    state.set_screen(size)?;
    info!(rows = size.rows, cols = size.cols, "session running");

    // ── Running ──────────────────────────────────────────────────
    let mut frames: u64 = 0;
    while state.running {
        render::render_frame(&state, &mut streams.output)?;
        frames += 1;
        state.process_key(&mut streams.input, &mut streams.echo)?;
    }
    debug!(frames, "quit requested");

    // ── Terminating ──────────────────────────────────────────────
    raw.exit()?;
    state.raw_mode_active = false;
    info!("session ended");

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duxi_term::error::TermError;
    use duxi_term::terminal::{SetWhen, Size};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::io;
    use std::mem;

    /// Minimal terminal double: tracks the current attributes only.
    struct Fake {
        tty: bool,
        attrs: RefCell<libc::termios>,
        size: Size,
    }

    impl Fake {
        fn new(size: Size) -> Self {
            #[allow(unsafe_code)]
            let mut attrs: libc::termios = unsafe { mem::zeroed() };
            attrs.c_lflag = libc::ECHO | libc::ICANON;
            Self {
                tty: true,
                attrs: RefCell::new(attrs),
                size,
            }
        }

        fn is_cooked(&self) -> bool {
            self.attrs.borrow().c_lflag & libc::ICANON != 0
        }
    }

    impl Tty for Fake {
        fn is_terminal(&self) -> bool {
            self.tty
        }
        fn get_attrs(&self) -> io::Result<libc::termios> {
            Ok(*self.attrs.borrow())
        }
        fn set_attrs(&self, _when: SetWhen, attrs: &libc::termios) -> io::Result<()> {
            *self.attrs.borrow_mut() = *attrs;
            Ok(())
        }
        fn window_size(&self) -> io::Result<Size> {
            Ok(self.size)
        }
    }

    fn streams(input: &[u8]) -> Streams<&[u8], Vec<u8>, Vec<u8>> {
        Streams {
            input,
            output: Vec::new(),
            echo: Vec::new(),
        }
    }

    #[test]
    fn quits_on_ctrl_q_and_restores() {
        let tty = Fake::new(Size { cols: 80, rows: 24 });
        let mut io = streams(b"ab\x11ignored");
        let state = run(&tty, &RawModeConfig::default(), &mut io).unwrap();

        assert!(!state.running);
        assert!(!state.raw_mode_active);
        assert_eq!((state.screen_rows, state.screen_cols), (24, 80));
        assert!(tty.is_cooked());
        assert_eq!(io.echo, b"ab");
        assert_eq!(io.input, b"ignored");
    }

    #[test]
    fn renders_once_per_key() {
        let tty = Fake::new(Size { cols: 20, rows: 5 });
        let mut io = streams(b"xy\x11");
        run(&tty, &RawModeConfig::default(), &mut io).unwrap();

        let out = String::from_utf8(io.output).unwrap();
        assert_eq!(out.matches("\x1b[?25l").count(), 3);
        assert!(out.ends_with("\x1b[H\x1b[?25h"));
    }

    #[test]
    fn not_a_terminal_fails_before_anything_is_written() {
        let tty = Fake {
            tty: false,
            ..Fake::new(Size { cols: 80, rows: 24 })
        };
        let mut io = streams(b"\x11");
        let err = run(&tty, &RawModeConfig::default(), &mut io).unwrap_err();
        assert!(matches!(err, TermError::NotATerminal));
        assert!(io.output.is_empty());
    }

    #[test]
    fn probe_failure_restores_terminal() {
        let tty = Fake::new(Size { cols: 0, rows: 0 });
        let mut io = streams(b"not a report");
        let err = run(&tty, &RawModeConfig::default(), &mut io).unwrap_err();
        assert!(matches!(err, TermError::MalformedResponse(_)));
        assert!(tty.is_cooked());
    }

    #[test]
    fn zero_rows_is_fatal_and_restores() {
        let tty = Fake::new(Size { cols: 80, rows: 0 });
        let mut io = streams(b"\x11");
        let err = run(&tty, &RawModeConfig::default(), &mut io).unwrap_err();
        assert!(matches!(err, TermError::EmptyScreen { rows: 0, cols: 80 }));
        assert!(tty.is_cooked());
        assert!(io.output.is_empty(), "nothing rendered");
    }

    #[test]
    fn probed_size_is_used() {
        let tty = Fake::new(Size { cols: 0, rows: 0 });
        let mut io = streams(b"\x1b[3;4R\x1b[10;40R\x11");
        let state = run(&tty, &RawModeConfig::default(), &mut io).unwrap();
        assert_eq!((state.screen_rows, state.screen_cols), (10, 40));
        let out = String::from_utf8(io.output).unwrap();
        assert!(out.starts_with("\x1b[6n\x1b[999C\x1b[999B\x1b[6n\x1b[3;4H\x1b[?25l"));
    }
}
