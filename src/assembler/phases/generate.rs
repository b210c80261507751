use super::resolve::LabelTable;
use super::types::{Located, Statement};
use crate::common;
use crate::spec::{
    defs::inst::{Form, InstDef, InstSet},
    types::hw::{branch_offset, Byte, Reg},
};
use log::trace;
use std::fmt::Display;
use std::num::Wrapping;
use strum::IntoEnumIterator;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnknownInstruction(String),
    UnknownRegister(String),
    Syntax(String),
    NumericParse(String),
    LengthMismatch {
        mnemonic: String,
        assumed: usize,
        emitted: usize,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownInstruction(name) => write!(f, "Unknown instruction: '{}'", name),
            Error::UnknownRegister(name) => write!(f, "Unknown register: '{}'", name),
            Error::Syntax(expected) => write!(f, "Syntax error, expected: {}", expected),
            Error::NumericParse(raw) => write!(
                f,
                "Could not parse '{}': not a label, hex literal or decimal literal",
                raw
            ),
            Error::LengthMismatch {
                mnemonic,
                assumed,
                emitted,
            } => write!(
                f,
                "Instruction '{}' was assumed to take {} bytes but encoded to {}",
                mnemonic, assumed, emitted
            ),
        }
    }
}

const HEX_PREFIXES: [&str; 2] = ["0x", "0X"];

/// Parses a decimal (optionally signed) or `0x`-prefixed hexadecimal literal.
/// Whatever the magnitude, the result is taken modulo 256.
fn parse_numeric(raw: &str) -> Option<Byte> {
    let hex = HEX_PREFIXES.iter().find_map(|pfx| raw.strip_prefix(*pfx));
    let (negative, digits, radix) = match hex {
        Some(digits) => (false, digits, 16),
        None => match raw.strip_prefix('-') {
            Some(digits) => (true, digits, 10),
            None => (false, raw.strip_prefix('+').unwrap_or(raw), 10),
        },
    };

    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.chars().try_fold(Wrapping(0u8), |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * Wrapping(radix as Byte) + Wrapping(d as Byte))
    })?;

    let value = if negative { -magnitude } else { magnitude };
    Some(value.0)
}

fn parse_reg(raw: &str) -> Result<Reg, Error> {
    Reg::iter()
        .find(|reg| common::eq_ignore_case(raw, &reg.to_string()))
        .ok_or_else(|| Error::UnknownRegister(raw.to_owned()))
}

/// Label names take priority over numeric literals.
fn parse_value(raw: &str, labels: &LabelTable) -> Result<Byte, Error> {
    labels
        .get(raw)
        .or_else(|| parse_numeric(raw))
        .ok_or_else(|| Error::NumericParse(raw.to_owned()))
}

/// Peels the `[...]` off a memory operand. Bare addresses are let through, but
/// stray or unbalanced brackets are not.
fn strip_brackets(raw: &str) -> Option<&str> {
    let inner = match (raw.strip_prefix('['), raw.ends_with(']')) {
        (Some(rest), true) => &rest[..rest.len() - 1],
        (None, false) => raw,
        _ => return None,
    };

    if inner.is_empty() || inner.contains(|c: char| c == '[' || c == ']') {
        None
    } else {
        Some(inner)
    }
}

impl InstDef {
    fn syntax_error(&self) -> Error {
        Error::Syntax(self.syntax().to_string())
    }

    pub fn encode<S: AsRef<str>>(
        &self,
        operands: &[S],
        labels: &LabelTable,
        pc: usize,
    ) -> Result<Vec<Byte>, Error> {
        let operands = operands.iter().map(AsRef::as_ref).collect::<Vec<&str>>();
        let header = self.header();

        let bytes = match (self.form, operands.as_slice()) {
            (Form::Bare, []) => vec![header],
            (Form::RegImm, [rd, imm]) => vec![
                header | parse_reg(rd)?.encode_dst(),
                parse_value(imm, labels)?,
            ],
            (Form::RegReg, [rd, rs]) => vec![
                header | parse_reg(rd)?.encode_dst(),
                parse_reg(rs)?.encode_src(),
            ],
            (Form::RegMem, [rd, addr]) => {
                let rd = parse_reg(rd)?;
                let addr = strip_brackets(addr).ok_or_else(|| self.syntax_error())?;
                vec![header | rd.encode_dst(), parse_value(addr, labels)?]
            }
            (Form::Abs, [addr]) => vec![header, parse_value(addr, labels)?],
            (Form::Rel, [target]) => vec![header, branch_offset(pc, parse_value(target, labels)?)],
            _ => return Err(self.syntax_error()),
        };

        Ok(bytes)
    }
}

/// Encodes one instruction, wherever it sits in the program.
pub fn encode<S: AsRef<str>>(
    mnemonic: &str,
    operands: &[S],
    labels: &LabelTable,
    pc: usize,
) -> Result<Vec<Byte>, Error> {
    InstSet::get()
        .lookup(mnemonic)
        .ok_or_else(|| Error::UnknownInstruction(mnemonic.to_ascii_uppercase()))?
        .encode(operands, labels, pc)
}

impl Statement {
    fn generate(&self, labels: &LabelTable, pc: usize) -> Result<Vec<Byte>, Error> {
        let (mnemonic, operands) = match self {
            Statement::LabelDef(_) => return Ok(vec![]),
            Statement::Inst(mnemonic, operands) => (mnemonic, operands),
        };

        let bytes = encode(mnemonic, operands, labels, pc)?;

        // Every label address after this point depends on the two passes agreeing.
        let assumed = self.assumed_len();
        if bytes.len() != assumed {
            return Err(Error::LengthMismatch {
                mnemonic: mnemonic.to_owned(),
                assumed,
                emitted: bytes.len(),
            });
        }

        trace!("{:#04X}: {} {:02X?}", pc, mnemonic, bytes);
        Ok(bytes)
    }
}

pub fn generate(
    stmts: &[Located<Statement>],
    labels: &LabelTable,
) -> Result<Vec<Byte>, Located<Error>> {
    let mut pc = 0;
    common::accumulate_vecs(stmts.iter().map(|stmt| {
        let bytes = stmt.map_result_value(|stmt| stmt.generate(labels, pc))?;
        pc += bytes.len();
        Ok(bytes)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::types::hw::Opcode;

    #[test]
    fn numerics_wrap_modulo_256() {
        assert_eq!(parse_numeric("0"), Some(0));
        assert_eq!(parse_numeric("255"), Some(0xFF));
        assert_eq!(parse_numeric("256"), Some(0));
        assert_eq!(parse_numeric("300"), Some(44));
        assert_eq!(parse_numeric("-1"), Some(0xFF));
        assert_eq!(parse_numeric("+7"), Some(7));
        assert_eq!(parse_numeric("0x1F"), Some(0x1F));
        assert_eq!(parse_numeric("0XfF"), Some(0xFF));
        assert_eq!(parse_numeric("0x1234"), Some(0x34));
    }

    #[test]
    fn malformed_numerics_are_rejected() {
        for raw in &["", "-", "0x", "12a", "0xG1", "--1", "-0x5", "1.5"] {
            assert_eq!(parse_numeric(raw), None, "{:?}", raw);
        }
    }

    #[test]
    fn brackets_must_balance() {
        assert_eq!(strip_brackets("[0xF0]"), Some("0xF0"));
        assert_eq!(strip_brackets("0xF0"), Some("0xF0"));
        assert_eq!(strip_brackets("[data]"), Some("data"));
        assert_eq!(strip_brackets("[0xF0"), None);
        assert_eq!(strip_brackets("0xF0]"), None);
        assert_eq!(strip_brackets("[]"), None);
        assert_eq!(strip_brackets("[[1]]"), None);
    }

    fn sample_operands(form: Form) -> Vec<String> {
        let operands: &[&str] = match form {
            Form::Bare => &[],
            Form::RegImm => &["R1", "7"],
            Form::RegReg => &["R1", "R2"],
            Form::RegMem => &["R1", "[0x10]"],
            Form::Abs | Form::Rel => &["0x10"],
        };
        operands.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn every_instruction_encodes_to_its_assumed_length() {
        for opcode in Opcode::iter() {
            let idef = InstSet::get().lookup_opcode(opcode);
            let stmt = Statement::Inst(idef.name.clone(), sample_operands(idef.form));

            let bytes = stmt.generate(&LabelTable::default(), 0).unwrap();
            assert_eq!(bytes.len(), stmt.assumed_len(), "{}", idef.name);
            assert_eq!(bytes.len(), idef.len(), "{}", idef.name);
        }
    }

    #[test]
    fn registers_ignore_case() {
        assert_eq!(parse_reg("r3"), Ok(Reg::R3));
        assert_eq!(parse_reg("R7"), Ok(Reg::R7));
        assert_eq!(parse_reg("R8"), Err(Error::UnknownRegister("R8".to_owned())));
    }
}
