// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode and RAII restoration.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, sigaction, and raw fd writes.
// These are the standard POSIX interfaces for terminal control; there is no
// safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. `enter_raw_mode` snapshots the
// original attributes, arms the emergency restore paths, then applies the
// raw attributes. The returned `RawMode` guard puts the snapshot back when
// it is dropped, so every early return and every `?` on the way out of the
// session restores the terminal.
//
// Two paths cannot rely on the guard running:
//
//   panic — the hook writes show-cursor directly to fd 1 (bypassing Rust's
//   stdout lock), restores termios from a global backup, then delegates to
//   the original panic handler so the message prints to a working terminal.
//
//   signals — SIGTERM, SIGHUP, SIGQUIT and SIGINT restore from the same
//   backup and re-raise with the default disposition, so the process still
//   dies with the signal's exit status.
//
// The OS-facing calls sit behind the `Tty` trait. `StdTty` is the real
// terminal; tests drive the same code with an in-memory fake.

use std::io;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use tracing::{debug, warn};

use crate::error::{Result, TermError};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Whether both dimensions are non-zero.
    #[inline]
    #[must_use]
    pub const fn is_usable(self) -> bool {
        self.cols > 0 && self.rows > 0
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// When a `tcsetattr` takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetWhen {
    /// `TCSANOW`: immediately.
    Now,
    /// `TCSAFLUSH`: after pending output drains; pending input is discarded.
    Flush,
}

impl SetWhen {
    const fn action(self) -> libc::c_int {
        match self {
            Self::Now => libc::TCSANOW,
            Self::Flush => libc::TCSAFLUSH,
        }
    }
}

/// The operating-system side of a terminal.
pub trait Tty {
    /// Whether standard input is an interactive terminal device.
    fn is_terminal(&self) -> bool;

    /// Read the current attributes (`tcgetattr`).
    ///
    /// # Errors
    ///
    /// Returns the OS error if the attributes cannot be read.
    fn get_attrs(&self) -> io::Result<libc::termios>;

    /// Apply attributes (`tcsetattr`).
    ///
    /// # Errors
    ///
    /// Returns the OS error if the attributes cannot be applied.
    fn set_attrs(&self, when: SetWhen, attrs: &libc::termios) -> io::Result<()>;

    /// Ask the kernel for the window size (`ioctl(TIOCGWINSZ)`).
    ///
    /// # Errors
    ///
    /// Returns the OS error if the request is unsupported.
    fn window_size(&self) -> io::Result<Size>;

    /// Remember `original` for restoration outside the guard (panic,
    /// signals). Called before raw attributes are applied.
    fn arm_emergency_restore(&self, _original: &libc::termios) {}

    /// Forget the snapshot armed by [`arm_emergency_restore`](Self::arm_emergency_restore).
    fn disarm_emergency_restore(&self) {}
}

/// The process's real terminal: stdin for attributes, stdout for size.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTty;

impl Tty for StdTty {
    fn is_terminal(&self) -> bool {
        unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
    }

    fn get_attrs(&self) -> io::Result<libc::termios> {
        unsafe {
            let mut termios: libc::termios = mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(termios)
        }
    }

    fn set_attrs(&self, when: SetWhen, attrs: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, when.action(), attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn window_size(&self) -> io::Result<Size> {
        let mut ws: libc::winsize = unsafe { mem::zeroed() };
        if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }

    fn arm_emergency_restore(&self, original: &libc::termios) {
        TERMIOS_BACKUP.arm(original);
        install_panic_hook();
        install_signal_handlers();
    }

    fn disarm_emergency_restore(&self) {
        TERMIOS_BACKUP.disarm();
    }
}

// ─── Raw Mode Attributes ────────────────────────────────────────────────────

/// Read behaviour of the raw terminal.
///
/// The defaults give a polling loop: `read()` returns after at most one
/// decisecond whether or not a byte arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawModeConfig {
    /// `VTIME`: read timeout in deciseconds.
    pub read_timeout_ds: u8,
    /// `VMIN`: minimum bytes before `read()` returns.
    pub min_bytes: u8,
}

impl Default for RawModeConfig {
    fn default() -> Self {
        Self {
            read_timeout_ds: 1,
            min_bytes: 0,
        }
    }
}

/// Derive raw attributes from `original`.
///
/// Input: no break-to-SIGINT, no CR→NL, no parity check, no 8th-bit strip,
/// no XON/XOFF. Output: no post-processing. Local: no echo, no canonical
/// mode, no extended input processing, no signal characters. Control:
/// 8-bit characters.
#[must_use]
pub fn make_raw(original: libc::termios, config: &RawModeConfig) -> libc::termios {
    let mut t = original;
    t.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_cflag |= libc::CS8;
    t.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    t.c_cc[libc::VMIN] = config.min_bytes;
    t.c_cc[libc::VTIME] = config.read_timeout_ds;
    t
}

// ─── RawMode Guard ──────────────────────────────────────────────────────────

/// Raw-mode session with RAII restoration.
///
/// Holds the attribute snapshot taken at entry. Dropping the guard, or
/// calling [`exit`](Self::exit), writes the snapshot back.
///
/// # Example
///
/// ```no_run
/// use duxi_term::terminal::{RawModeConfig, StdTty, enter_raw_mode};
///
/// let tty = StdTty;
/// let raw = enter_raw_mode(&tty, &RawModeConfig::default())?;
/// // ... render frames, read keys ...
/// drop(raw); // Terminal restored.
/// # Ok::<(), duxi_term::error::TermError>(())
/// ```
pub struct RawMode<'a, T: Tty> {
    tty: &'a T,
    original: Option<libc::termios>,
}

/// Put the terminal into raw mode.
///
/// The emergency restore paths are armed before the raw attributes are
/// applied, and the guard exists before `tcsetattr` runs, so a failure
/// anywhere after the snapshot still restores it.
///
/// # Errors
///
/// - [`TermError::NotATerminal`] if stdin is not a terminal.
/// - [`TermError::QueryFailed`] if the current attributes cannot be read.
/// - [`TermError::ConfigureFailed`] if the raw attributes cannot be applied.
pub fn enter_raw_mode<'a, T: Tty>(tty: &'a T, config: &RawModeConfig) -> Result<RawMode<'a, T>> {
    if !tty.is_terminal() {
        return Err(TermError::NotATerminal);
    }

    let original = tty.get_attrs().map_err(TermError::QueryFailed)?;
    tty.arm_emergency_restore(&original);

    let guard = RawMode {
        tty,
        original: Some(original),
    };

    tty.set_attrs(SetWhen::Flush, &make_raw(original, config))
        .map_err(TermError::ConfigureFailed)?;

    debug!(
        vmin = config.min_bytes,
        vtime = config.read_timeout_ds,
        "entered raw mode"
    );
    Ok(guard)
}

impl<T: Tty> RawMode<'_, T> {
    /// Whether the snapshot is still waiting to be restored.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    /// The attributes captured at entry, while still active.
    #[cfg(test)]
    pub(crate) const fn original(&self) -> Option<&libc::termios> {
        self.original.as_ref()
    }

    /// Restore the original attributes immediately (`TCSANOW`).
    ///
    /// Idempotent: once restored, further calls do nothing. If the restore
    /// fails the guard stays active and `Drop` tries again.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::ConfigureFailed`] if `tcsetattr` fails.
    pub fn exit(&mut self) -> Result<()> {
        let Some(original) = self.original else {
            return Ok(());
        };

        self.tty
            .set_attrs(SetWhen::Now, &original)
            .map_err(TermError::ConfigureFailed)?;

        self.original = None;
        self.tty.disarm_emergency_restore();
        debug!("left raw mode");
        Ok(())
    }
}

impl<T: Tty> Drop for RawMode<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            warn!("failed to restore terminal: {e}");
        }
    }
}

// ─── Emergency Restore ──────────────────────────────────────────────────────

/// Termios snapshot that a signal handler may read.
///
/// The snapshot is written once and never moves. After that the only
/// mutable state is the `armed` flag, so [`get`](Self::get) is two atomic
/// loads: no lock, no allocation.
struct EmergencyBackup {
    armed: AtomicBool,
    termios: OnceLock<libc::termios>,
}

impl EmergencyBackup {
    const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            termios: OnceLock::new(),
        }
    }

    /// Store `original` (first call only) and expose it to the handlers.
    ///
    /// A later session restores to the first snapshot.
    fn arm(&self, original: &libc::termios) {
        if self.termios.set(*original).is_err() {
            debug!("emergency backup already holds a snapshot");
        }
        self.armed.store(true, Ordering::Release);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    /// The snapshot, while armed. Async-signal-safe.
    fn get(&self) -> Option<&libc::termios> {
        if self.armed.load(Ordering::Acquire) {
            self.termios.get()
        } else {
            None
        }
    }
}

/// Global backup of original termios for panic and signal recovery.
///
/// The [`RawMode`] guard owns its own copy, but neither the panic hook nor
/// a signal handler can reach it.
static TERMIOS_BACKUP: EmergencyBackup = EmergencyBackup::new();

/// Byte sequence written on panic: show the cursor.
///
/// A frame hides the cursor for the duration of one write; a panic right
/// after that write would otherwise leave it invisible.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h";

/// Signals that restore the terminal before terminating the process.
const FATAL_SIGNALS: [libc::c_int; 4] = [libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT, libc::SIGINT];

static PANIC_HOOK_INSTALLED: Once = Once::new();
static SIGNAL_HANDLERS_INSTALLED: Once = Once::new();

/// Restore termios from the global backup. Best-effort, ignores errors.
///
/// Only atomic loads and `tcsetattr`, so it is safe to call from a signal
/// handler.
fn restore_termios_from_backup() {
    if let Some(original) = TERMIOS_BACKUP.get() {
        unsafe {
            let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
        }
    }
}

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            unsafe {
                let _ = libc::write(
                    libc::STDOUT_FILENO,
                    EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
                    EMERGENCY_RESTORE.len(),
                );
            }
            restore_termios_from_backup();
            original(info);
        }));
    });
}

/// Install the restore-and-reraise handler for every [`FATAL_SIGNALS`] entry.
///
/// `SA_RESETHAND` puts the default disposition back on entry, so the
/// re-raised signal terminates the process once the handler returns. A
/// signal that was already ignored (e.g. SIGHUP under `nohup`) stays ignored.
fn install_signal_handlers() {
    SIGNAL_HANDLERS_INSTALLED.call_once(|| {
        for sig in FATAL_SIGNALS {
            unsafe {
                let mut old: libc::sigaction = mem::zeroed();
                let mut sa: libc::sigaction = mem::zeroed();
                sa.sa_sigaction = restore_and_reraise as *const () as usize;
                sa.sa_flags = libc::SA_RESETHAND;
                libc::sigemptyset(&raw mut sa.sa_mask);
                if libc::sigaction(sig, &raw const sa, &raw mut old) != 0 {
                    warn!(signal = sig, "failed to install restore handler");
                    continue;
                }
                if old.sa_sigaction == libc::SIG_IGN {
                    libc::sigaction(sig, &raw const old, std::ptr::null_mut());
                }
            }
        }
    });
}

extern "C" fn restore_and_reraise(sig: libc::c_int) {
    restore_termios_from_backup();
    unsafe {
        libc::raise(sig);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
