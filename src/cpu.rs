mod debug;
mod instruction;
mod keypad;
mod mem;
mod regs;
mod snapshot;
mod stack;

pub mod io;
pub mod screen;

pub use self::instruction::{Instruction, UnknownOpcode};
pub use self::keypad::Keypad;
pub use self::mem::Mem;
pub use self::screen::FrameBuffer;
pub use self::snapshot::Snapshot;

use self::io::{Display, Input};
use self::regs::Regs;
use self::screen::{HEIGHT, WIDTH};
use self::stack::Stack;
use crate::{config::Config, error::LoadError};
use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{collections::BTreeSet, fs, path::Path};

/// Progress of an `FX0A` key wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    /// Not waiting.
    Idle,
    /// `FX0A` found no key down; it will be fetched again next step.
    Press { x: u8 },
    /// `key` was stored; nothing runs until it is let go.
    Release { key: u8 },
}

/// The interpreter: memory, registers, timers, plus the display and keypad
/// it's wired to.
///
/// Nothing here keeps time. A driver calls [`Chip8::step`] at the clock
/// speed of its choice, and [`Chip8::tick_timers`] at 60 Hz.
#[derive(Debug)]
pub struct Chip8<D, I> {
    pc: u16,
    i: u16,
    sp: u16,
    v: Regs,
    mem: Mem,
    dt: u8,
    st: u8,
    opcode: u16,
    key_wait: KeyWait,
    origin: u16,
    strict: bool,
    rng: StdRng,
    display: D,
    input: I,
}

impl<D: Display, I: Input> Chip8<D, I> {
    pub fn new(display: D, input: I) -> Self {
        Self::with_config(display, input, &Config::default())
    }

    /// A new machine reports the font table in its first memory drain.
    pub fn with_config(display: D, input: I, config: &Config) -> Self {
        let mut mem = Mem::new();
        mem.mark_font_dirty();

        Self {
            pc: config.origin,
            i: 0,
            sp: stack::REGION.start,
            v: Regs::new(),
            mem,
            dt: 0,
            st: 0,
            opcode: 0,
            key_wait: KeyWait::Idle,
            origin: config.origin,
            strict: config.strict,
            rng: StdRng::from_entropy(),
            display,
            input,
        }
    }

    /// Use a fixed seed for `CXNN`, e.g. for reproducible test runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Back to the power-on state: zeroed registers and timers, fresh
    /// memory with the font table, blank screen, empty dirty sets.
    pub fn reset(&mut self) {
        self.pc = self.origin;
        self.i = 0;
        self.sp = stack::REGION.start;
        self.v = Regs::new();
        self.mem = Mem::new();
        self.dt = 0;
        self.st = 0;
        self.opcode = 0;
        self.key_wait = KeyWait::Idle;
        self.display.clear();
        debug!("reset");
    }

    /// Copy `rom` into memory at `origin`. Nothing is written on error.
    pub fn load(&mut self, rom: &[u8], origin: u16) -> Result<(), LoadError> {
        if origin as usize + rom.len() > Mem::LEN as usize {
            return Err(LoadError::TooLarge {
                origin,
                len: rom.len(),
            });
        }

        self.mem.write_slice(origin, rom);
        debug!("loaded {} bytes at 0x{origin:04x}", rom.len());
        Ok(())
    }

    /// [`Chip8::load`] at the configured origin.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.load(rom, self.origin)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>, origin: u16) -> Result<(), LoadError> {
        let path = path.as_ref();
        let rom = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        self.load(&rom, origin)
    }

    /// Fetch, decode and execute one instruction. Returns the opcode.
    ///
    /// While a key wait is holding for a release, this does nothing and
    /// returns the `FX0A` opcode again.
    pub fn step(&mut self) -> u16 {
        if let KeyWait::Release { key } = self.key_wait {
            if self.input.is_down(key) {
                return self.opcode;
            }
            self.key_wait = KeyWait::Idle;
        }

        let opcode = u16::from_be_bytes([self.mem[self.pc], self.mem[self.pc.wrapping_add(1)]]);
        self.skip();
        self.execute(opcode)
    }

    /// Execute `opcode` as if it had just been fetched, without touching
    /// memory at `pc` first.
    pub fn execute(&mut self, opcode: u16) -> u16 {
        self.opcode = opcode;

        match Instruction::decode(opcode) {
            Ok(instr) => {
                trace!("0x{:04x}: {opcode:04x}  {instr}", self.pc.wrapping_sub(2));
                self.run(instr);
            }
            // Keep going: plenty of ROMs contain data the interpreter wanders into.
            Err(err) => warn!("{err} (pc=0x{:04x})", self.pc),
        }

        opcode
    }

    /// Count both timers down by one, stopping at zero.
    pub fn tick_timers(&mut self) {
        self.dt = self.dt.saturating_sub(1);
        self.st = self.st.saturating_sub(1);
    }

    fn run(&mut self, instr: Instruction) {
        use Instruction::*;

        match instr {
            Sys { addr } => debug!("ignoring SYS 0x{addr:03x}"),
            ClearScreen => self.display.clear(),
            Return => {
                let pc = self.stack().pop();
                self.pc = pc;
            }
            Jump { addr } => self.pc = addr,
            Call { addr } => {
                let pc = self.pc;
                self.stack().push(pc);
                self.pc = addr;
            }
            SkipEqImm { x, byte } => {
                if self.v[x] == byte {
                    self.skip();
                }
            }
            SkipNeImm { x, byte } => {
                if self.v[x] != byte {
                    self.skip();
                }
            }
            SkipEqReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.skip();
                }
            }
            SkipNeReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.skip();
                }
            }
            LoadImm { x, byte } => self.v.set(x, byte),
            AddImm { x, byte } => self.v.set(x, self.v[x].wrapping_add(byte)),
            Move { x, y } => self.v.set(x, self.v[y]),
            Or { x, y } => self.v.set(x, self.v[x] | self.v[y]),
            And { x, y } => self.v.set(x, self.v[x] & self.v[y]),
            Xor { x, y } => self.v.set(x, self.v[x] ^ self.v[y]),
            // For the flag-setting ops, VF is written last so that it wins
            // when X is F.
            Add { x, y } => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v.set(x, sum);
                self.v.set_flag(carry);
            }
            Sub { x, y } => {
                let (diff, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v.set(x, diff);
                self.v.set_flag(!borrow);
            }
            SubReverse { x, y } => {
                let (diff, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v.set(x, diff);
                self.v.set_flag(!borrow);
            }
            ShiftRight { x } => {
                let value = self.v[x];
                self.v.set(x, value >> 1);
                self.v.set_flag(value & 1 != 0);
            }
            ShiftLeft { x } => {
                let value = self.v[x];
                self.v.set(x, value << 1);
                self.v.set_flag(value & 0x80 != 0);
            }
            LoadIndex { addr } => self.i = addr,
            JumpOffset { addr } => self.pc = Mem::wrap(addr + self.v[0] as u16),
            Random { x, mask } => {
                let byte: u8 = self.rng.gen();
                self.v.set(x, byte & mask);
            }
            Draw { x, y, n } => self.draw_sprite(x, y, n),
            SkipKeyDown { x } => {
                if self.input.is_down(self.v[x] & 0xf) {
                    self.skip();
                }
            }
            SkipKeyUp { x } => {
                if !self.input.is_down(self.v[x] & 0xf) {
                    self.skip();
                }
            }
            ReadDelay { x } => self.v.set(x, self.dt),
            WaitKey { x } => self.wait_key(x),
            SetDelay { x } => self.dt = self.v[x],
            SetSound { x } => self.st = self.v[x],
            // Quirk: no carry into VF.
            AddIndex { x } => self.i = self.i.wrapping_add(self.v[x] as u16),
            Glyph { x } => self.i = Mem::sprite_offset(self.v[x]),
            Bcd { x } => {
                self.check_index_run(3);
                let bcd = bcd_from_u8(self.v[x]);
                for (offset, digit) in (0..).zip(bcd) {
                    self.mem.write(self.i.wrapping_add(offset), digit);
                }
            }
            StoreRegs { x } => {
                self.check_index_run(x as u16 + 1);
                for reg in 0..=x {
                    self.mem.write(self.i.wrapping_add(reg as u16), self.v[reg]);
                }
            }
            LoadRegs { x } => {
                self.check_index_run(x as u16 + 1);
                for reg in 0..=x {
                    self.v.set(reg, self.mem[self.i.wrapping_add(reg as u16)]);
                }
            }
        }
    }

    fn skip(&mut self) {
        self.pc = Mem::wrap(self.pc.wrapping_add(2));
    }

    fn stack(&mut self) -> Stack<'_> {
        Stack::new(&mut self.mem, &mut self.sp).strict(self.strict)
    }

    /// XOR an 8xN sprite from memory at I onto the display, at (VX, VY).
    ///
    /// The origin wraps around the screen but the sprite itself is clipped
    /// at the right and bottom edges. VF ends up 1 iff some lit pixel was
    /// turned off.
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) {
        let left = self.v[x] as usize % WIDTH;
        let top = self.v[y] as usize % HEIGHT;
        self.v.set_flag(false);
        self.check_index_run(n as u16);

        for dy in 0..n {
            let row_y = top + dy as usize;
            if row_y >= HEIGHT {
                break;
            }

            let sprite_row = self.mem[self.i.wrapping_add(dy as u16)];
            for dx in 0..8 {
                let col_x = left + dx;
                if col_x >= WIDTH {
                    break;
                }
                if sprite_row & (0x80 >> dx) == 0 {
                    continue;
                }

                let pixel = screen::index(col_x, row_y);
                if self.display.is_on(pixel) {
                    self.display.clear_pixel(pixel);
                    self.v.set_flag(true);
                } else {
                    self.display.set(pixel);
                }
            }
        }
    }

    /// `FX0A`. Polls each key once; with nothing down, rewinds `pc` so the
    /// driver's next `step` lands here again.
    fn wait_key(&mut self, x: u8) {
        match (0..16).find(|&k| self.input.is_down(k)) {
            Some(key) => {
                self.v.set(x, key);
                self.key_wait = KeyWait::Release { key };
            }
            None => {
                self.pc = Mem::wrap(self.pc.wrapping_sub(2));
                self.key_wait = KeyWait::Press { x };
            }
        }
    }

    /// In strict mode, complain if `len` bytes starting at I run off the
    /// end of memory. They wrap around either way.
    fn check_index_run(&self, len: u16) {
        if self.strict && self.i as usize + len as usize > Mem::LEN as usize {
            warn!("I=0x{:04x} + {len} runs past the end of memory", self.i);
        }
    }
}

/// Read-only views, for debuggers and front ends.
impl<D, I> Chip8<D, I> {
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn v(&self, x: u8) -> u8 {
        self.v[x]
    }

    pub fn registers(&self) -> [u8; 16] {
        self.v.as_array()
    }

    pub fn memory(&self) -> &[u8] {
        self.mem.as_slice()
    }

    pub fn delay_timer(&self) -> u8 {
        self.dt
    }

    pub fn sound_timer(&self) -> u8 {
        self.st
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.key_wait != KeyWait::Idle
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.pc,
            i: self.i,
            sp: self.sp,
            v: self.v.as_array(),
            delay_timer: self.dt,
            sound_timer: self.st,
            opcode: self.opcode,
            memory: self.mem.as_slice().to_vec(),
        }
    }

    /// Register indices written since the last call.
    pub fn drain_dirty_registers(&mut self) -> BTreeSet<u8> {
        self.v.drain_dirty()
    }

    /// Memory addresses written since the last call.
    pub fn drain_dirty_memory(&mut self) -> BTreeSet<u16> {
        self.mem.drain_dirty()
    }
}

/// Convert x to "big endian" binary coded decimal:
/// [hundreds, tens, ones]
fn bcd_from_u8(mut x: u8) -> [u8; 3] {
    // Start with [ones, tens, hundred], and then reverse.
    let mut digits = [0u8; 3];
    for digit in &mut digits {
        *digit = x % 10;
        x /= 10;
    }

    digits.reverse();
    digits
}
