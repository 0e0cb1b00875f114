// SPDX-License-Identifier: MIT
//
// duxi — a minimal raw-mode terminal screen controller.
//
// This is the binary that wires the pieces together:
//
//   duxi-term → raw mode guard, geometry probe, key reader, frame output
//   session   → init, render/read/dispatch loop, teardown
//
// Each keypress flows through:
//
//   stdin → read_key → EditorState::dispatch → echo or quit
//   render_frame → OutputBuffer → one write() → terminal
//
// Exit status is 0 after Ctrl+Q and 1 after any error. The terminal is
// restored before either.

mod config;
mod editor;
mod error;
mod logging;
mod render;
mod session;

use std::process;

use duxi_term::fd::{FdReader, FdWriter};
use duxi_term::terminal::{RawModeConfig, StdTty};
use tracing::error;

use crate::config::Config;
use crate::error::AppError;
use crate::session::Streams;

fn run() -> Result<(), AppError> {
    logging::init(&Config::from_env())?;

    let mut streams = Streams {
        input: FdReader::stdin(),
        output: FdWriter::stdout(),
        echo: FdWriter::stdin(),
    };

    session::run(&StdTty, &RawModeConfig::default(), &mut streams)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("{e}");
        eprintln!("duxi: {e}");
        process::exit(1);
    }
}
