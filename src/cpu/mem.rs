use std::{
    collections::BTreeSet,
    fmt::{self, Debug},
    ops::Index,
};

use super::debug;

/// The 4 KiB address space, with font sprites at the bottom.
///
/// Every address is taken modulo [`Mem::LEN`]; there is no such thing as an
/// out-of-range access. Writes go through [`Mem::write`] so they can be
/// recorded in the dirty set.
#[derive(Clone)]
pub struct Mem {
    bytes: Box<[u8; Self::LEN as usize]>,
    dirty: BTreeSet<u16>,
}

impl Mem {
    pub const LEN: u16 = 4 * 1024;
    pub const ROM_START: u16 = 0x0200;
    pub const FONT_START: u16 = 0x0000;

    /// Bytes per built-in hex digit sprite.
    pub const GLYPH_LEN: u16 = 5;

    /// Fresh memory: all zeros except for the font table.
    pub fn new() -> Self {
        let mut bytes = Box::new([0u8; Self::LEN as usize]);

        let font: Vec<_> = DIGITS.into_iter().flatten().collect();
        let start = Self::FONT_START as usize;
        bytes[start..][..font.len()].copy_from_slice(&font);

        Self {
            bytes,
            dirty: BTreeSet::new(),
        }
    }

    /// One past the last address used by the font table.
    pub const fn font_end() -> u16 {
        Self::FONT_START + DIGITS.len() as u16 * Self::GLYPH_LEN
    }

    /// Address of the built-in sprite for `digit`. Not masked: `digit`
    /// above 0xf points past the font table.
    pub fn sprite_offset(digit: u8) -> u16 {
        Self::GLYPH_LEN * digit as u16
    }

    pub fn wrap(addr: u16) -> u16 {
        addr % Self::LEN
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let addr = Self::wrap(addr);
        self.bytes[addr as usize] = value;
        self.dirty.insert(addr);
    }

    /// Copy `data` into memory at `origin`. The caller checks bounds.
    pub fn write_slice(&mut self, origin: u16, data: &[u8]) {
        let start = origin as usize;
        debug_assert!(start + data.len() <= Self::LEN as usize);

        self.bytes[start..][..data.len()].copy_from_slice(data);
        self.dirty
            .extend((0..data.len()).map(|offset| origin + offset as u16));
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }

    /// Record the font table as written, the way a power-on load of it
    /// would.
    pub fn mark_font_dirty(&mut self) {
        self.dirty.extend(Self::FONT_START..Self::font_end());
    }

    /// Take the set of addresses written since the last call.
    pub fn drain_dirty(&mut self) -> BTreeSet<u16> {
        std::mem::take(&mut self.dirty)
    }
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

/// Bitmaps for the built-in hex digit sprites.
const DIGITS: [[u8; 5]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0],
    [0x20, 0x60, 0x20, 0x20, 0x70],
    [0xF0, 0x10, 0xF0, 0x80, 0xF0],
    [0xF0, 0x10, 0xF0, 0x10, 0xF0],
    [0x90, 0x90, 0xF0, 0x10, 0x10],
    [0xF0, 0x80, 0xF0, 0x10, 0xF0],
    [0xF0, 0x80, 0xF0, 0x90, 0xF0],
    [0xF0, 0x10, 0x20, 0x40, 0x40],
    [0xF0, 0x90, 0xF0, 0x90, 0xF0],
    [0xF0, 0x90, 0xF0, 0x10, 0xF0],
    [0xF0, 0x90, 0xF0, 0x90, 0x90],
    [0xE0, 0x90, 0xE0, 0x90, 0xE0],
    [0xF0, 0x80, 0x80, 0x80, 0xF0],
    [0xE0, 0x90, 0x90, 0x90, 0xE0],
    [0xF0, 0x80, 0xF0, 0x80, 0xF0],
    [0xF0, 0x80, 0xF0, 0x80, 0x80],
];

impl Index<u16> for Mem {
    type Output = u8;

    fn index(&self, index: u16) -> &Self::Output {
        &self.bytes[Self::wrap(index) as usize]
    }
}

impl Debug for Mem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return self.debug_compact(f);
        }

        // Similar to unix `hexdump`: print rows of bytes.

        writeln!(f)?;

        let mut prev_blank = false;
        for (i, line) in self.bytes.chunks(16).enumerate() {
            // Skip large blocks of zeros.
            if line.iter().all(|&b| b == 0) {
                if !prev_blank {
                    writeln!(f, "...")?;
                }
                prev_blank = true;
                continue;
            }
            prev_blank = false;

            write!(f, "{i:02x}0: ")?;
            debug::write_row(f, line)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Mem {
    /// Helper for <Mem as Debug>::fmt
    fn debug_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show up to and including the last non-zero value.
        let end_idx = self
            .bytes
            .iter()
            .rposition(|&x| x != 0)
            .map_or(0, |i| i + 1);

        write!(f, "[")?;
        debug::write_row(f, &self.bytes[..end_idx])?;
        write!(f, "]")
    }
}
