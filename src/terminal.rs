//! Raw-mode handling for the hosting terminal.
//!
//! LC-3 programs expect unbuffered, unechoed keyboard input. The host puts
//! stdin into raw mode before execution starts and restores the previous
//! state when the [`RawLock`] is dropped. The saved state is also reachable
//! process-wide so the keyboard reader thread can restore it before exiting
//! on Ctrl+C.

use std::io::stdin;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::OnceLock;
use termios::{ECHO, ICANON, TCSAFLUSH, Termios, tcsetattr};

static SAVED_STATE: OnceLock<(RawFd, Termios)> = OnceLock::new();

pub struct RawLock {
    fd: RawFd,
    termios_orig: Termios,
}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        let _ = tcsetattr(self.fd, TCSAFLUSH, &self.termios_orig);
    }
}

/// Disables line buffering and input echo on stdin.
///
/// Fails with the underlying I/O error when stdin is not a terminal, which
/// callers may treat as non-fatal (piped input never produces key events).
///
/// # Errors
/// - stdin is not a tty
/// - terminal attributes cannot be read or applied
pub fn set_terminal_raw() -> Result<RawLock, std::io::Error> {
    let fd = stdin().as_raw_fd();
    let termios_orig = Termios::from_fd(fd)?;
    let mut termios_raw = termios_orig;
    // https://man7.org/linux/man-pages/man3/termios.3.html
    termios_raw.c_lflag &= !(ICANON | ECHO);
    tcsetattr(fd, TCSAFLUSH, &termios_raw)?;
    let _ = SAVED_STATE.set((fd, termios_orig));
    Ok(RawLock { fd, termios_orig })
}

/// Restores the state saved by [`set_terminal_raw`], if any.
///
/// Used by the keyboard reader thread right before terminating the process,
/// where the [`RawLock`] destructor will not run.
pub fn restore_terminal() {
    if let Some((fd, termios_orig)) = SAVED_STATE.get() {
        let _ = tcsetattr(*fd, TCSAFLUSH, termios_orig);
    }
}
