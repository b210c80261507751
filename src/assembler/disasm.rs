use crate::spec::{
    defs::inst::{Form, InstDef, InstSet},
    types::hw::{branch_target, Byte, Opcode, Reg},
};
use itertools::Itertools;
use num_traits::FromPrimitive;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    InvalidOpcode(usize, Byte),
    UnexpectedEndOfStream(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidOpcode(addr, raw) => {
                write!(f, "Invalid opcode at {:#04X}: {:#04X}", addr, raw)
            }
            Error::UnexpectedEndOfStream(addr) => write!(
                f,
                "Unexpectedly encountered end of stream in the instruction at {:#04X}",
                addr
            ),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    Imm(Byte),
    Mem(Byte),
    Addr(Byte),
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Imm(val) | Operand::Addr(val) => write!(f, "{:#04X}", val),
            Operand::Mem(addr) => write!(f, "[{:#04X}]", addr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInst {
    pub addr: usize,
    pub raw: Vec<Byte>,
    pub idef: &'static InstDef,
    pub operands: Vec<Operand>,
}

// Prints as source which assembles back to the same bytes (modulo the bits the
// encoding leaves unused). Branches show their absolute target.
impl Display for DisassembledInst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.idef.name)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands.iter().join(", "))?;
        }
        Ok(())
    }
}

fn decode_operands(idef: &InstDef, addr: usize, b0: Byte, b1: Byte) -> Vec<Operand> {
    let rd = || Reg::from_u8(Reg::decode_dst_raw(b0)).unwrap_or_default();
    match idef.form {
        Form::Bare => vec![],
        Form::RegImm => vec![Operand::Reg(rd()), Operand::Imm(b1)],
        Form::RegReg => vec![
            Operand::Reg(rd()),
            Operand::Reg(Reg::from_u8(Reg::decode_src_raw(b1)).unwrap_or_default()),
        ],
        Form::RegMem => vec![Operand::Reg(rd()), Operand::Mem(b1)],
        Form::Abs => vec![Operand::Addr(b1)],
        Form::Rel => vec![Operand::Addr(branch_target(addr, b1))],
    }
}

/// Decodes the instruction starting at `addr`, consuming exactly its bytes.
pub fn next_inst(
    bytes: &mut impl Iterator<Item = Byte>,
    addr: usize,
) -> Result<Option<DisassembledInst>, Error> {
    let b0 = match bytes.next() {
        Some(b0) => b0,
        None => return Ok(None),
    };

    let idef = Opcode::from_u8(Opcode::decode_raw(b0))
        .map(|opcode| InstSet::get().lookup_opcode(opcode))
        .ok_or(Error::InvalidOpcode(addr, b0))?;

    let raw = match idef.len() {
        1 => vec![b0],
        _ => vec![b0, bytes.next().ok_or(Error::UnexpectedEndOfStream(addr))?],
    };

    let operands = decode_operands(idef, addr, b0, raw.get(1).copied().unwrap_or(0));
    Ok(Some(DisassembledInst {
        addr,
        raw,
        idef,
        operands,
    }))
}

pub fn disassemble(program: &[Byte]) -> Result<Vec<DisassembledInst>, Error> {
    let mut bytes = program.iter().copied();
    let mut insts = Vec::new();

    let mut addr = 0;
    while let Some(inst) = next_inst(&mut bytes, addr)? {
        addr += inst.raw.len();
        insts.push(inst);
    }

    Ok(insts)
}

pub fn listing(insts: &[DisassembledInst]) -> String {
    insts
        .iter()
        .map(|inst| {
            format!(
                "{:#04X}:  {: <6} {}",
                inst.addr,
                inst.raw.iter().map(|b| format!("{:02X}", b)).join(" "),
                inst
            )
        })
        .join("\n")
}
