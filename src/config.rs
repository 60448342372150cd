use crate::cpu::{io::TIME_BETWEEN_TICKS_NS, Mem};

/// Instructions per second, unless told otherwise.
pub const DEFAULT_CLOCK_SPEED: u32 = 500;

/// Bounds for the clock speed as adjusted from the keyboard.
pub const MIN_CLOCK_SPEED: u32 = 10;
pub const MAX_CLOCK_SPEED: u32 = 1_000_000;

/// How much one faster/slower request changes the clock speed by.
pub const CLOCK_SPEED_STEP: u32 = 50;

/// Settings shared by the interpreter and whatever drives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Instructions executed per second.
    pub clock_speed: u32,
    /// Delay/sound timer ticks per second.
    pub timer_speed: u32,
    /// Where ROMs are loaded, and where execution starts.
    pub origin: u16,
    /// Log a warning when the stack or the index register run off the end
    /// of their memory. Doesn't change what happens.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_speed: DEFAULT_CLOCK_SPEED,
            timer_speed: (10_u64.pow(9) / TIME_BETWEEN_TICKS_NS) as u32,
            origin: Mem::ROM_START,
            strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.clock_speed, 500);
        assert_eq!(config.timer_speed, 60);
        assert_eq!(config.origin, 0x200);
        assert!(!config.strict);
    }
}
