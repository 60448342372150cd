use std::fmt;

use thiserror::Error;

/// A decoded CHIP-8 instruction.
///
/// `x` and `y` are register indices (`0x0..=0xf`), `addr` is a 12-bit
/// address, `byte` an 8-bit immediate and `n` a 4-bit immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN`: call a native machine code routine. Not emulated.
    Sys { addr: u16 },
    /// `00E0`
    ClearScreen,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump { addr: u16 },
    /// `2NNN`
    Call { addr: u16 },
    /// `3XNN`
    SkipEqImm { x: u8, byte: u8 },
    /// `4XNN`
    SkipNeImm { x: u8, byte: u8 },
    /// `5XY0`
    SkipEqReg { x: u8, y: u8 },
    /// `6XNN`
    LoadImm { x: u8, byte: u8 },
    /// `7XNN`
    AddImm { x: u8, byte: u8 },
    /// `8XY0`
    Move { x: u8, y: u8 },
    /// `8XY1`
    Or { x: u8, y: u8 },
    /// `8XY2`
    And { x: u8, y: u8 },
    /// `8XY3`
    Xor { x: u8, y: u8 },
    /// `8XY4`
    Add { x: u8, y: u8 },
    /// `8XY5`: `VX = VX - VY`
    Sub { x: u8, y: u8 },
    /// `8XY6`
    ShiftRight { x: u8 },
    /// `8XY7`: `VX = VY - VX`
    SubReverse { x: u8, y: u8 },
    /// `8XYE`
    ShiftLeft { x: u8 },
    /// `9XY0`
    SkipNeReg { x: u8, y: u8 },
    /// `ANNN`
    LoadIndex { addr: u16 },
    /// `BNNN`
    JumpOffset { addr: u16 },
    /// `CXNN`
    Random { x: u8, mask: u8 },
    /// `DXYN`
    Draw { x: u8, y: u8, n: u8 },
    /// `EX9E`
    SkipKeyDown { x: u8 },
    /// `EXA1`
    SkipKeyUp { x: u8 },
    /// `FX07`
    ReadDelay { x: u8 },
    /// `FX0A`
    WaitKey { x: u8 },
    /// `FX15`
    SetDelay { x: u8 },
    /// `FX18`
    SetSound { x: u8 },
    /// `FX1E`
    AddIndex { x: u8 },
    /// `FX29`
    Glyph { x: u8 },
    /// `FX33`
    Bcd { x: u8 },
    /// `FX55`
    StoreRegs { x: u8 },
    /// `FX65`
    LoadRegs { x: u8 },
}

/// An opcode with no instruction behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown opcode 0x{0:04x}")]
pub struct UnknownOpcode(pub u16);

impl Instruction {
    pub fn decode(opcode: u16) -> Result<Self, UnknownOpcode> {
        use Instruction::*;

        let [op, x, y, n] = nibbles_from_u16(opcode);
        let addr = opcode & 0x0fff;
        let byte = (opcode & 0x00ff) as u8;

        let instr = match (op, n) {
            (0x0, _) => match opcode {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => Sys { addr },
            },
            (0x1, _) => Jump { addr },
            (0x2, _) => Call { addr },
            (0x3, _) => SkipEqImm { x, byte },
            (0x4, _) => SkipNeImm { x, byte },
            (0x5, 0x0) => SkipEqReg { x, y },
            (0x6, _) => LoadImm { x, byte },
            (0x7, _) => AddImm { x, byte },
            (0x8, 0x0) => Move { x, y },
            (0x8, 0x1) => Or { x, y },
            (0x8, 0x2) => And { x, y },
            (0x8, 0x3) => Xor { x, y },
            (0x8, 0x4) => Add { x, y },
            (0x8, 0x5) => Sub { x, y },
            (0x8, 0x6) => ShiftRight { x },
            (0x8, 0x7) => SubReverse { x, y },
            (0x8, 0xe) => ShiftLeft { x },
            (0x9, 0x0) => SkipNeReg { x, y },
            (0xa, _) => LoadIndex { addr },
            (0xb, _) => JumpOffset { addr },
            (0xc, _) => Random { x, mask: byte },
            (0xd, _) => Draw { x, y, n },
            (0xe, _) => match byte {
                0x9e => SkipKeyDown { x },
                0xa1 => SkipKeyUp { x },
                _ => return Err(UnknownOpcode(opcode)),
            },
            (0xf, _) => match byte {
                0x07 => ReadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => Glyph { x },
                0x33 => Bcd { x },
                0x55 => StoreRegs { x },
                0x65 => LoadRegs { x },
                _ => return Err(UnknownOpcode(opcode)),
            },
            _ => return Err(UnknownOpcode(opcode)),
        };

        Ok(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Sys { addr } => write!(f, "SYS 0x{addr:03x}"),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP 0x{addr:03x}"),
            Call { addr } => write!(f, "CALL 0x{addr:03x}"),
            SkipEqImm { x, byte } => write!(f, "SE V{x:X}, 0x{byte:02x}"),
            SkipNeImm { x, byte } => write!(f, "SNE V{x:X}, 0x{byte:02x}"),
            SkipEqReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            LoadImm { x, byte } => write!(f, "LD V{x:X}, 0x{byte:02x}"),
            AddImm { x, byte } => write!(f, "ADD V{x:X}, 0x{byte:02x}"),
            Move { x, y } => write!(f, "LD V{x:X}, V{y:X}"),
            Or { x, y } => write!(f, "OR V{x:X}, V{y:X}"),
            And { x, y } => write!(f, "AND V{x:X}, V{y:X}"),
            Xor { x, y } => write!(f, "XOR V{x:X}, V{y:X}"),
            Add { x, y } => write!(f, "ADD V{x:X}, V{y:X}"),
            Sub { x, y } => write!(f, "SUB V{x:X}, V{y:X}"),
            ShiftRight { x } => write!(f, "SHR V{x:X}"),
            SubReverse { x, y } => write!(f, "SUBN V{x:X}, V{y:X}"),
            ShiftLeft { x } => write!(f, "SHL V{x:X}"),
            SkipNeReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            LoadIndex { addr } => write!(f, "LD I, 0x{addr:03x}"),
            JumpOffset { addr } => write!(f, "JP V0, 0x{addr:03x}"),
            Random { x, mask } => write!(f, "RND V{x:X}, 0x{mask:02x}"),
            Draw { x, y, n } => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            SkipKeyDown { x } => write!(f, "SKP V{x:X}"),
            SkipKeyUp { x } => write!(f, "SKNP V{x:X}"),
            ReadDelay { x } => write!(f, "LD V{x:X}, DT"),
            WaitKey { x } => write!(f, "LD V{x:X}, K"),
            SetDelay { x } => write!(f, "LD DT, V{x:X}"),
            SetSound { x } => write!(f, "LD ST, V{x:X}"),
            AddIndex { x } => write!(f, "ADD I, V{x:X}"),
            Glyph { x } => write!(f, "LD F, V{x:X}"),
            Bcd { x } => write!(f, "LD B, V{x:X}"),
            StoreRegs { x } => write!(f, "LD [I], V{x:X}"),
            LoadRegs { x } => write!(f, "LD V{x:X}, [I]"),
        }
    }
}

/// Big endian byte (and bit) order.
fn nibbles_from_u16(x: u16) -> [u8; 4] {
    let a = (x & 0xf000) >> 12;
    let b = (x & 0x0f00) >> 8;
    let c = (x & 0x00f0) >> 4;
    let d = x & 0x000f;
    [a, b, c, d].map(|n| n as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn nibbles() {
        assert_eq!(nibbles_from_u16(0xabcd), [0xa, 0xb, 0xc, 0xd]);
    }

    #[test]
    fn decode_operands() {
        assert_eq!(Instruction::decode(0x0123), Ok(Sys { addr: 0x123 }));
        assert_eq!(Instruction::decode(0x1abc), Ok(Jump { addr: 0xabc }));
        assert_eq!(Instruction::decode(0x3a42), Ok(SkipEqImm { x: 0xa, byte: 0x42 }));
        assert_eq!(Instruction::decode(0x8124), Ok(Add { x: 0x1, y: 0x2 }));
        assert_eq!(Instruction::decode(0x8127), Ok(SubReverse { x: 0x1, y: 0x2 }));
        assert_eq!(Instruction::decode(0xd12f), Ok(Draw { x: 0x1, y: 0x2, n: 0xf }));
        assert_eq!(Instruction::decode(0xc7f0), Ok(Random { x: 0x7, mask: 0xf0 }));
        assert_eq!(Instruction::decode(0xe59e), Ok(SkipKeyDown { x: 0x5 }));
        assert_eq!(Instruction::decode(0xf30a), Ok(WaitKey { x: 0x3 }));
        assert_eq!(Instruction::decode(0xfe65), Ok(LoadRegs { x: 0xe }));
    }

    #[test]
    fn decode_rejects_unmapped_encodings() {
        for opcode in [
            0x5121, 0x8128, 0x812f, 0x9121, 0xe1a2, 0xe19f, 0xf100,
            0xf1ff,
        ] {
            assert_eq!(Instruction::decode(opcode), Err(UnknownOpcode(opcode)));
        }
    }

    #[test]
    fn every_mapped_opcode_class_decodes() {
        let known = [
            0x0123, 0x00e0, 0x00ee, 0x1000, 0x2000, 0x3000, 0x4000, 0x5000, 0x6000, 0x7000, 0x8000,
            0x8001, 0x8002, 0x8003, 0x8004, 0x8005, 0x8006, 0x8007, 0x800e, 0x9000, 0xa000,
            0xb000, 0xc000, 0xd000, 0xe09e, 0xe0a1, 0xf007, 0xf00a, 0xf015, 0xf018, 0xf01e,
            0xf029, 0xf033, 0xf055, 0xf065,
        ];
        for opcode in known {
            assert!(Instruction::decode(opcode).is_ok(), "0x{opcode:04x}");
        }
    }

    #[test]
    fn display_mnemonics() {
        assert_eq!(Instruction::decode(0x6a05).unwrap().to_string(), "LD VA, 0x05");
        assert_eq!(Instruction::decode(0xd015).unwrap().to_string(), "DRW V0, V1, 5");
        assert_eq!(UnknownOpcode(0x5121).to_string(), "unknown opcode 0x5121");
    }
}
