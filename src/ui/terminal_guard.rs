//! Raw-mode terminal ownership with guaranteed restore

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};

pub type WizardTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Owns the ratatui terminal and restores the shell when dropped.
///
/// Cleanup runs on normal exit, on early return through `?`, and (through
/// [`install_panic_hook`]) on panic.
pub struct TerminalGuard {
    terminal: WizardTerminal,
    restored: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let terminal =
            Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn terminal(&mut self) -> &mut WizardTerminal {
        &mut self.terminal
    }

    /// Restore the terminal now instead of at drop
    pub fn restore(&mut self) {
        if !self.restored {
            self.restored = true;
            Self::cleanup();
        }
    }

    /// Best-effort restore; errors are ignored since there is nowhere to report them
    pub fn cleanup() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Install panic hook that restores terminal before printing panic.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalGuard::cleanup();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_is_callable_without_tty() {
        TerminalGuard::cleanup();
    }
}
