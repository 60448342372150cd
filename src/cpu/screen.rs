use std::fmt::{self, Debug};

use super::io::Display;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Row-major pixel index of `(x, y)`.
pub fn index(x: usize, y: usize) -> usize {
    WIDTH * y + x
}

/// An in-memory [`Display`]. `Debug` renders it as rows of `#` and `.`.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [bool; WIDTH * HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [false; WIDTH * HEIGHT],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[index(x, y)]
    }

    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(WIDTH)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        *self = Self::new();
    }

    fn set(&mut self, index: usize) {
        self.pixels[index] = true;
    }

    fn clear_pixel(&mut self, index: usize) {
        self.pixels[index] = false;
    }

    fn is_on(&self, index: usize) -> bool {
        self.pixels[index]
    }
}

impl Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for row in self.rows() {
            for &pixel in row {
                let c = if pixel { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear() {
        let mut fb = FrameBuffer::new();
        fb.set(index(3, 2));
        assert!(fb.pixel(3, 2));
        assert!(fb.is_on(2 * WIDTH + 3));
        fb.clear_pixel(index(3, 2));
        assert_eq!(fb.lit(), 0);

        fb.set(0);
        fb.set(WIDTH * HEIGHT - 1);
        fb.clear();
        assert_eq!(fb, FrameBuffer::new());
    }

    #[test]
    fn debug_render() {
        let mut fb = FrameBuffer::new();
        fb.set(index(1, 0));
        let s = format!("{fb:?}");
        let mut lines = s.lines().skip(1);
        assert_eq!(lines.next().map(|l| &l[..3]), Some(".#."));
        assert_eq!(s.lines().count(), HEIGHT + 1);
    }
}
