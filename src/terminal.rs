use crossterm::terminal;

/// Puts the terminal back into cooked mode when dropped.
pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure, since it does not work
/// when stdin is not a terminal, e.g. for cargo doc tests or piped input.
#[must_use]
pub fn set_terminal_raw() -> RawLock {
    if let Err(e) = terminal::enable_raw_mode() {
        log::warn!("Could not set terminal to raw mode: {e}");
    } else {
        log::debug!("Terminal set to raw mode");
    }
    RawLock {}
}
