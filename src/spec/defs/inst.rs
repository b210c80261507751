use crate::spec::types::hw::{Byte, Opcode};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;
use strum::IntoEnumIterator;

/*
    Every instruction is one of six operand forms. The form alone decides the
    encoded length, so the label pass (which only looks at mnemonics) and the
    encoding pass (which looks at everything) compute lengths through the same
    `InstDef::len()`.

        Bare    NOP                 op<<4
        RegImm  LDI Rd, imm         op<<4 | Rd<<1,  imm
        RegReg  ADD Rd, Rs          op<<4 | Rd<<1,  Rs & 0x07
        RegMem  LD  Rd, [addr]      op<<4 | Rd<<1,  addr
        Abs     JMP addr            op<<4,          addr
        Rel     BRZ addr            op<<4,          addr - (pc + 2)
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Bare,
    RegImm,
    RegReg,
    RegMem,
    Abs,
    Rel,
}

impl Form {
    pub const fn len(self) -> usize {
        match self {
            Form::Bare => 1,
            _ => 2,
        }
    }

    fn operand_syntax(self) -> &'static str {
        match self {
            Form::Bare => "",
            Form::RegImm => "Rn, imm",
            Form::RegReg => "Rd, Rs",
            Form::RegMem => "Rd, [addr]",
            Form::Abs | Form::Rel => "addr_or_label",
        }
    }

    const fn of(opcode: Opcode) -> Form {
        match opcode {
            Opcode::Nop => Form::Bare,
            Opcode::Ldi => Form::RegImm,
            Opcode::Add | Opcode::Sub | Opcode::And | Opcode::Or | Opcode::Xor => Form::RegReg,
            Opcode::Ld | Opcode::St => Form::RegMem,
            Opcode::Jmp => Form::Abs,
            Opcode::Brz => Form::Rel,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InstDef {
    pub name: String,
    pub opcode: Opcode,
    pub form: Form,
}

impl InstDef {
    fn new(opcode: Opcode) -> InstDef {
        InstDef {
            name: opcode.to_string(),
            opcode,
            form: Form::of(opcode),
        }
    }

    pub fn len(&self) -> usize {
        self.form.len()
    }

    pub fn header(&self) -> Byte {
        self.opcode.encode()
    }

    pub fn syntax(&self) -> Syntax<'_> {
        Syntax(self)
    }
}

/// Renders the expected form of an instruction, e.g. `LD Rd, [addr]`.
pub struct Syntax<'a>(&'a InstDef);

impl<'a> Display for Syntax<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.form {
            Form::Bare => write!(f, "{}", self.0.name),
            form => write!(f, "{} {}", self.0.name, form.operand_syntax()),
        }
    }
}

pub struct InstSet {
    by_name: HashMap<String, InstDef>,
}

static INST_SET: Lazy<InstSet> = Lazy::new(InstSet::build);

impl InstSet {
    fn build() -> InstSet {
        InstSet {
            by_name: Opcode::iter()
                .map(InstDef::new)
                .map(|idef| (idef.name.clone(), idef))
                .collect(),
        }
    }

    pub fn get() -> &'static InstSet {
        Lazy::force(&INST_SET)
    }

    /// Mnemonics are matched without regard to case.
    pub fn lookup(&self, mnemonic: &str) -> Option<&InstDef> {
        self.by_name.get(&mnemonic.to_ascii_uppercase())
    }

    pub fn lookup_opcode(&self, opcode: Opcode) -> &InstDef {
        // Every opcode was inserted under its own name by `build`.
        &self.by_name[&opcode.to_string()]
    }

    /// The length the label pass assigns to a line starting with `mnemonic`.
    /// Unknown mnemonics count as two bytes here; they are rejected when encoded.
    pub fn inst_len(&self, mnemonic: &str) -> usize {
        self.lookup(mnemonic).map_or(Form::RegImm.len(), InstDef::len)
    }
}
