// SPDX-License-Identifier: MIT
//
// duxi-term — terminal session control for duxi.
//
// Puts a POSIX terminal into raw mode and guarantees it comes back out,
// discovers the screen size (kernel query, or a cursor-position probe when
// the kernel has no answer), reads keys one byte at a time, and writes
// whole frames with a single syscall.
//
// Direct termios and ANSI escape sequences, no TUI framework in between:
// every byte sent to the terminal is accounted for.

pub mod ansi;
pub mod error;
pub mod fd;
pub mod geometry;
pub mod input;
pub mod output;
pub mod terminal;
