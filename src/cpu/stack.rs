use std::ops::Range;

use log::warn;

use super::mem::Mem;

/// The call stack lives in main memory, between the font table and the
/// program origin. Programs can (and some do) read and clobber it directly.
pub const REGION: Range<u16> = Mem::font_end() + 2..Mem::ROM_START;

/// A view of the stack: the shared memory plus the stack pointer.
///
/// Return addresses are stored low byte first; `sp` points at the next free
/// byte. Nothing stops the pointer from leaving [`REGION`]: overflow just
/// overwrites whatever memory comes next.
pub struct Stack<'a> {
    mem: &'a mut Mem,
    sp: &'a mut u16,
    strict: bool,
}

impl<'a> Stack<'a> {
    pub fn new(mem: &'a mut Mem, sp: &'a mut u16) -> Self {
        Self {
            mem,
            sp,
            strict: false,
        }
    }

    /// Report (but don't prevent) the pointer leaving the stack region.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn push(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.push_byte(lo);
        self.push_byte(hi);
        self.check();
    }

    pub fn pop(&mut self) -> u16 {
        let hi = self.pop_byte();
        let lo = self.pop_byte();
        self.check();
        u16::from_be_bytes([hi, lo])
    }

    fn push_byte(&mut self, byte: u8) {
        self.mem.write(*self.sp, byte);
        *self.sp = Mem::wrap(self.sp.wrapping_add(1));
    }

    fn pop_byte(&mut self) -> u8 {
        *self.sp = Mem::wrap(self.sp.wrapping_sub(1));
        self.mem[*self.sp]
    }

    fn check(&self) {
        // `sp == end` is a full stack, not an overflow.
        let sp = *self.sp;
        if self.strict && !(REGION.start..=REGION.end).contains(&sp) {
            warn!(
                "stack pointer 0x{sp:04x} outside 0x{:04x}..0x{:04x}",
                REGION.start, REGION.end
            );
        }
    }
}
