//! The devices the interpreter talks to.
//!
//! Both are deliberately dumb: no rendering, no event handling. A front end
//! implements them however it likes; [`FrameBuffer`](super::FrameBuffer) and
//! [`Keypad`](super::Keypad) are in-memory versions for headless use.

/// Nanosecond duration for the delay timer and sound timer "ticks".
///
/// Frequency: 60 Hz.
pub const TIME_BETWEEN_TICKS_NS: u64 = 10_u64.pow(9) / 60;

/// A 64x32 monochrome pixel grid.
///
/// Pixels are addressed as `index = WIDTH * y + x`.
pub trait Display {
    /// Turn every pixel off.
    fn clear(&mut self);

    fn set(&mut self, index: usize);

    fn clear_pixel(&mut self, index: usize);

    fn is_on(&self, index: usize) -> bool;
}

/// The 16-key hex keypad. Keycodes are `0x0..=0xf`.
pub trait Input {
    /// Is the given key currently held?
    fn is_down(&self, key: u8) -> bool;

    /// The lowest-numbered key currently held, if any.
    fn first_down(&self) -> Option<u8> {
        (0..16).find(|&k| self.is_down(k))
    }
}

impl<T: Display + ?Sized> Display for &mut T {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn set(&mut self, index: usize) {
        (**self).set(index)
    }

    fn clear_pixel(&mut self, index: usize) {
        (**self).clear_pixel(index)
    }

    fn is_on(&self, index: usize) -> bool {
        (**self).is_on(index)
    }
}

impl<T: Input + ?Sized> Input for &T {
    fn is_down(&self, key: u8) -> bool {
        (**self).is_down(key)
    }
}

impl<T: Input + ?Sized> Input for &mut T {
    fn is_down(&self, key: u8) -> bool {
        (**self).is_down(key)
    }
}
