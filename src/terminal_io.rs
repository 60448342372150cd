//! A `crossterm` front end: the screen is drawn as text in the alternate
//! screen, and keys come from terminal key events.

mod keyboard;
mod screen;

pub use self::keyboard::{Command, Keyboard};
pub use self::screen::Screen;

use anyhow::Result;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::warn;
use std::io;

/// Raw mode plus the alternate screen, for as long as this lives.
#[derive(Debug)]
pub struct Terminal {
    enhanced: bool,
}

impl Terminal {
    pub fn setup() -> Result<Self> {
        terminal::enable_raw_mode()?;

        // Key release events need the kitty keyboard protocol.
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            io::stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        } else {
            warn!("terminal doesn't report key releases; keys will be held briefly instead");
        }

        io::stdout()
            .execute(EnterAlternateScreen)?
            .execute(Clear(ClearType::All))?;

        Ok(Self { enhanced })
    }

    /// Whether key release events will arrive.
    pub fn reports_key_releases(&self) -> bool {
        self.enhanced
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        fn try_drop(this: &mut Terminal) -> Result<()> {
            // Reset the terminal mode. Otherwise it gets all wonky, and you
            // have to close it and open a new one.
            io::stdout().execute(LeaveAlternateScreen)?;
            if this.enhanced {
                io::stdout().execute(PopKeyboardEnhancementFlags)?;
            }
            terminal::disable_raw_mode()?;
            Ok(())
        }

        // Ignore errors.
        try_drop(self).ok();
    }
}
