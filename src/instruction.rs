//! # instruction
//!
//! Every CHIP-8 instruction is a big-endian 16-bit word. The leading nibble
//! picks the operation family; the rest of the word is carved up into the
//! conventional fields:
//!
//! ```text
//!   f x y n
//!   | | | `- n   low nibble, small immediate
//!   | | `--- y   register index
//!   | `----- x   register index
//!   `------- op  operation family
//!       `nn`  = low byte, 8-bit immediate
//!       `nnn` = low 12 bits, address
//! ```
use std::fmt;

/// The raw field decomposition of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub op: u8,
    pub x: usize,
    pub y: usize,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl Fields {
    pub fn new(word: u16) -> Self {
        Fields {
            op: (word >> 12) as u8,
            x: ((word >> 8) & 0xf) as usize,
            y: ((word >> 4) & 0xf) as usize,
            n: (word & 0xf) as u8,
            nn: (word & 0xff) as u8,
            nnn: word & 0x0fff,
        }
    }
}

/// A decoded instruction, one variant per operation.
///
/// `Sys` and `Unknown` are kept distinct so they can be disassembled and
/// logged, but both execute as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 0nnn, legacy machine code routine
    Sys(u16),
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xnn
    SeByte(usize, u8),
    /// 4xnn
    SneByte(usize, u8),
    /// 5xy0
    SeReg(usize, usize),
    /// 6xnn
    LdByte(usize, u8),
    /// 7xnn
    AddByte(usize, u8),
    /// 8xy0
    LdReg(usize, usize),
    /// 8xy1
    Or(usize, usize),
    /// 8xy2
    And(usize, usize),
    /// 8xy3
    Xor(usize, usize),
    /// 8xy4
    AddReg(usize, usize),
    /// 8xy5
    Sub(usize, usize),
    /// 8xy6
    Shr(usize, usize),
    /// 8xy7
    Subn(usize, usize),
    /// 8xyE
    Shl(usize, usize),
    /// 9xy0
    SneReg(usize, usize),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxnn
    Rnd(usize, u8),
    /// Dxyn
    Drw(usize, usize, u8),
    /// Ex9E
    Skp(usize),
    /// ExA1
    Sknp(usize),
    /// Fx07
    LdRegDt(usize),
    /// Fx0A
    LdKey(usize),
    /// Fx15
    LdDtReg(usize),
    /// Fx18
    LdSt(usize),
    /// Fx1E
    AddI(usize),
    /// Fx29
    LdF(usize),
    /// Fx33
    LdB(usize),
    /// Fx55
    LdDerefIReg(usize),
    /// Fx65
    LdRegDerefI(usize),
    /// anything else; executes as a no-op
    Unknown(u16),
}

impl Instruction {
    /// decode any 16-bit word; this never fails
    pub fn decode(word: u16) -> Instruction {
        use Instruction::*;
        let f = Fields::new(word);
        match f.op {
            0x0 => match f.nnn {
                0x0e0 => Cls,
                0x0ee => Ret,
                _ => Sys(f.nnn),
            },
            0x1 => Jp(f.nnn),
            0x2 => Call(f.nnn),
            0x3 => SeByte(f.x, f.nn),
            0x4 => SneByte(f.x, f.nn),
            0x5 if f.n == 0 => SeReg(f.x, f.y),
            0x6 => LdByte(f.x, f.nn),
            0x7 => AddByte(f.x, f.nn),
            0x8 => match f.n {
                0x0 => LdReg(f.x, f.y),
                0x1 => Or(f.x, f.y),
                0x2 => And(f.x, f.y),
                0x3 => Xor(f.x, f.y),
                0x4 => AddReg(f.x, f.y),
                0x5 => Sub(f.x, f.y),
                0x6 => Shr(f.x, f.y),
                0x7 => Subn(f.x, f.y),
                0xe => Shl(f.x, f.y),
                _ => Unknown(word),
            },
            0x9 if f.n == 0 => SneReg(f.x, f.y),
            0xa => LdI(f.nnn),
            0xb => JpV0(f.nnn),
            0xc => Rnd(f.x, f.nn),
            0xd => Drw(f.x, f.y, f.n),
            0xe => match f.nn {
                0x9e => Skp(f.x),
                0xa1 => Sknp(f.x),
                _ => Unknown(word),
            },
            0xf => match f.nn {
                0x07 => LdRegDt(f.x),
                0x0a => LdKey(f.x),
                0x15 => LdDtReg(f.x),
                0x18 => LdSt(f.x),
                0x1e => AddI(f.x),
                0x29 => LdF(f.x),
                0x33 => LdB(f.x),
                0x55 => LdDerefIReg(f.x),
                0x65 => LdRegDerefI(f.x),
                _ => Unknown(word),
            },
            _ => Unknown(word),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Sys(a) => write!(f, "SYS 0x{:03X}", a),
            Jp(a) => write!(f, "JP 0x{:03X}", a),
            Call(a) => write!(f, "CALL 0x{:03X}", a),
            SeByte(x, nn) => write!(f, "SE V{:X}, 0x{:02X}", x, nn),
            SneByte(x, nn) => write!(f, "SNE V{:X}, 0x{:02X}", x, nn),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, nn) => write!(f, "LD V{:X}, 0x{:02X}", x, nn),
            AddByte(x, nn) => write!(f, "ADD V{:X}, 0x{:02X}", x, nn),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, 0x{:03X}", a),
            JpV0(a) => write!(f, "JP V0, 0x{:03X}", a),
            Rnd(x, nn) => write!(f, "RND V{:X}, 0x{:02X}", x, nn),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdRegDt(x) => write!(f, "LD V{:X}, DT", x),
            LdKey(x) => write!(f, "LD V{:X}, K", x),
            LdDtReg(x) => write!(f, "LD DT, V{:X}", x),
            LdSt(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdF(x) => write!(f, "LD F, V{:X}", x),
            LdB(x) => write!(f, "LD B, V{:X}", x),
            LdDerefIReg(x) => write!(f, "LD [I], V{:X}", x),
            LdRegDerefI(x) => write!(f, "LD V{:X}, [I]", x),
            Unknown(w) => write!(f, "DW 0x{:04X}", w),
        }
    }
}
