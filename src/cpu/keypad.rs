use super::io::Input;

/// An in-memory [`Input`]: keys stay down until released.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    pressed: [bool; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics if `key` isn't `0x0..=0xf`.
    pub fn press(&mut self, key: u8) {
        assert!(key <= 0x0f);
        self.pressed[key as usize] = true;
    }

    pub fn release(&mut self, key: u8) {
        assert!(key <= 0x0f);
        self.pressed[key as usize] = false;
    }
}

impl Input for Keypad {
    fn is_down(&self, key: u8) -> bool {
        self.pressed.get(key as usize).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_down_is_lowest_key() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.first_down(), None);
        keypad.press(0xc);
        keypad.press(0x5);
        assert_eq!(keypad.first_down(), Some(0x5));
        keypad.release(0x5);
        assert_eq!(keypad.first_down(), Some(0xc));
        assert!(!keypad.is_down(0x20));
    }
}
