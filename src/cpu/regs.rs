use std::{
    collections::BTreeSet,
    fmt::{self, Debug},
    ops::Index,
};

use super::debug;

/// `V0` through `VF`. `VF` doubles as the carry/borrow/collision flag.
#[derive(Clone)]
pub struct Regs {
    regs: [u8; 16],
    dirty: BTreeSet<u8>,
}

impl Regs {
    pub const FLAG: u8 = 0xf;

    pub fn new() -> Self {
        Self {
            regs: [0; 16],
            dirty: BTreeSet::new(),
        }
    }

    pub fn set(&mut self, index: u8, value: u8) {
        let index = index & 0xf;
        self.regs[index as usize] = value;
        self.dirty.insert(index);
    }

    pub fn set_flag(&mut self, on: bool) {
        self.set(Self::FLAG, on as u8);
    }

    pub fn as_array(&self) -> [u8; 16] {
        self.regs
    }

    /// Take the set of register indices written since the last call.
    pub fn drain_dirty(&mut self) -> BTreeSet<u8> {
        std::mem::take(&mut self.dirty)
    }
}

impl Default for Regs {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for Regs {
    type Output = u8;

    fn index(&self, index: u8) -> &Self::Output {
        &self.regs[(index & 0xf) as usize]
    }
}

impl Debug for Regs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        debug::write_row(f, &self.regs)?;
        write!(f, " ]")?;
        Ok(())
    }
}
