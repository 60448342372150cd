use std::fmt::{self, Debug};

use super::debug;

/// A copy of the machine state, for debuggers and test harnesses.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub pc: u16,
    pub i: u16,
    pub sp: u16,
    pub v: [u8; 16],
    pub delay_timer: u8,
    pub sound_timer: u8,
    /// The most recently executed opcode.
    pub opcode: u16,
    pub memory: Vec<u8>,
}

struct Hex<'a>(&'a [u8]);

impl Debug for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        debug::write_row(f, self.0)?;
        write!(f, "]")
    }
}

impl Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("pc", &format_args!("0x{:04x}", self.pc))
            .field("i", &format_args!("0x{:04x}", self.i))
            .field("sp", &format_args!("0x{:04x}", self.sp))
            .field("v", &Hex(&self.v))
            .field("dt", &self.delay_timer)
            .field("st", &self.sound_timer)
            .field("opcode", &format_args!("0x{:04x}", self.opcode))
            .finish_non_exhaustive()
    }
}
