use derive_more::Display;
use num_derive::FromPrimitive;
use static_assertions::const_assert;
use std::num::Wrapping;
use strum_macros::EnumIter;

pub type Byte = u8;

pub const BYTE_WIDTH: usize = 8;
pub const OPCODE_WIDTH: usize = 4;
pub const REG_WIDTH: usize = 3;

pub const OPCODE_SHIFT: usize = BYTE_WIDTH - OPCODE_WIDTH;
pub const REG_SHIFT: usize = 1;

pub const REG_MASK: Byte = (1 << REG_WIDTH) - 1;

pub const OPCODE_COUNT: usize = 11;
pub const REG_COUNT: usize = 8;

const_assert!(OPCODE_COUNT <= 1 << OPCODE_WIDTH);
const_assert!(REG_COUNT <= 1 << REG_WIDTH);
const_assert!(REG_SHIFT + REG_WIDTH <= OPCODE_SHIFT);

// The discriminants are the hardware opcode values.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
pub enum Opcode {
    #[display(fmt = "NOP")]
    Nop = 0x0,
    #[display(fmt = "LDI")]
    Ldi = 0x1,
    #[display(fmt = "ADD")]
    Add = 0x2,
    #[display(fmt = "SUB")]
    Sub = 0x3,
    #[display(fmt = "AND")]
    And = 0x4,
    #[display(fmt = "OR")]
    Or = 0x5,
    #[display(fmt = "XOR")]
    Xor = 0x6,
    #[display(fmt = "LD")]
    Ld = 0x7,
    #[display(fmt = "ST")]
    St = 0x8,
    #[display(fmt = "BRZ")]
    Brz = 0x9,
    #[display(fmt = "JMP")]
    Jmp = 0xA,
}

impl Opcode {
    pub const fn encode(self) -> Byte {
        (self as Byte) << OPCODE_SHIFT
    }

    pub const fn decode_raw(byte: Byte) -> Byte {
        byte >> OPCODE_SHIFT
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    pub const fn index(self) -> Byte {
        self as Byte
    }

    /// Position of a destination register inside the first instruction byte.
    pub const fn encode_dst(self) -> Byte {
        self.index() << REG_SHIFT
    }

    pub const fn encode_src(self) -> Byte {
        self.index() & REG_MASK
    }

    pub const fn decode_dst_raw(byte: Byte) -> Byte {
        (byte >> REG_SHIFT) & REG_MASK
    }

    pub const fn decode_src_raw(byte: Byte) -> Byte {
        byte & REG_MASK
    }
}

impl Default for Reg {
    fn default() -> Reg {
        Reg::R0
    }
}

pub fn byte_from_usize_wrapping(v: usize) -> Byte {
    (v & usize::from(Byte::MAX)) as Byte
}

/// The displacement a relative branch at `pc` must carry to land on `target`,
/// measured from the address following the (two byte) branch.
pub fn branch_offset(pc: usize, target: Byte) -> Byte {
    (Wrapping(target) - Wrapping(byte_from_usize_wrapping(pc)) - Wrapping(2)).0
}

pub fn branch_target(pc: usize, offset: Byte) -> Byte {
    (Wrapping(byte_from_usize_wrapping(pc)) + Wrapping(2) + Wrapping(offset)).0
}
