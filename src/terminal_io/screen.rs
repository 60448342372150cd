use crate::cpu::{io::Display, FrameBuffer};
use anyhow::Result;
use crossterm::{cursor::MoveTo, style::Print, ExecutableCommand};
use std::{
    fmt::{self, Debug},
    io,
};

/// A [`Display`] that redraws itself in the terminal.
///
/// Pixel changes only touch the frame buffer; [`Screen::render`] puts it on
/// the terminal, and only if something changed since last time.
#[derive(Clone, Default)]
pub struct Screen {
    frame: FrameBuffer,
    changed: bool,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn render(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }
        io::stdout()
            .execute(MoveTo(0, 0))?
            .execute(Print(DisplayScreen(&self.frame)))?;
        self.changed = false;
        Ok(())
    }
}

impl Display for Screen {
    fn clear(&mut self) {
        self.frame.clear();
        self.changed = true;
    }

    fn set(&mut self, index: usize) {
        self.frame.set(index);
        self.changed = true;
    }

    fn clear_pixel(&mut self, index: usize) {
        self.frame.clear_pixel(index);
        self.changed = true;
    }

    fn is_on(&self, index: usize) -> bool {
        self.frame.is_on(index)
    }
}

impl Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.frame.fmt(f)
    }
}

/// Helper for `Screen::render`.
struct DisplayScreen<'a>(&'a FrameBuffer);

impl fmt::Display for DisplayScreen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use Debug formatting.
        let s = format!("{:?}", self.0);

        // Translate \n to \r\n to work correctly with raw-mode terminal.
        write!(f, "{}", s.replace('\n', "\r\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_writes_mark_changed() {
        let mut screen = Screen::new();
        assert!(!screen.changed);
        screen.set(5);
        assert!(screen.changed);
        assert!(screen.is_on(5));
        assert!(screen.frame().is_on(5));
    }

    #[test]
    fn raw_mode_line_endings() {
        let frame = FrameBuffer::new();
        let s = DisplayScreen(&frame).to_string();
        assert!(s.starts_with("\r\n"));
        assert_eq!(s.matches("\r\n").count(), s.matches('\n').count());
    }
}
