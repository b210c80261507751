use crate::spec::types::hw::{Byte, Opcode, Reg};
use itertools::Itertools;
use std::fmt::Display;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/*
    Lowers `a <op> b` into a complete program which leaves the result in R0, stores
    it at `RESULT_ADDR` and then idles forever.

    Operators with a matching ALU instruction take a single step. Multiplication has
    no opcode, so it is unrolled into a counting loop:

            R0 <- 0     accumulator
            R1 <- a     addend
            R2 <- b     counter
            R3 <- 1     decrement
        loop_mul:
            R0 <- R0 + R1
            R2 <- R2 - R3
            BRZ end_mul
            JMP loop_mul
        end_mul:

    The body runs before the counter is tested, so a zero `b` wraps the counter and
    the loop runs 256 times, which leaves 256 * a = 0 (mod 256) in the accumulator.
*/

pub const RESULT_ADDR: Byte = 0xF0;

const IDLE_LABEL: &str = "loop";
const MUL_LOOP_LABEL: &str = "loop_mul";
const MUL_END_LABEL: &str = "end_mul";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,
    #[strum(serialize = "*")]
    Mul,
}

impl Operator {
    /// The single ALU instruction implementing this operator, if there is one.
    pub fn alu_opcode(self) -> Option<Opcode> {
        match self {
            Operator::Add => Some(Opcode::Add),
            Operator::Sub => Some(Opcode::Sub),
            Operator::And => Some(Opcode::And),
            Operator::Or => Some(Opcode::Or),
            Operator::Xor => Some(Opcode::Xor),
            Operator::Mul => None,
        }
    }

    pub fn apply(self, a: Byte, b: Byte) -> Byte {
        match self {
            Operator::Add => a.wrapping_add(b),
            Operator::Sub => a.wrapping_sub(b),
            Operator::And => a & b,
            Operator::Or => a | b,
            Operator::Xor => a ^ b,
            Operator::Mul => a.wrapping_mul(b),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnsupportedOperation(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedOperation(op) => write!(
                f,
                "Unsupported operation '{}', supported operations: {}",
                op,
                Operator::iter().join(", ")
            ),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Default)]
struct Emitter {
    lines: Vec<String>,
}

impl Emitter {
    fn label(&mut self, label: &str) {
        self.lines.push(format!("{}:", label));
    }

    fn ldi(&mut self, rd: Reg, imm: impl Display) {
        self.lines.push(format!("{} {}, {}", Opcode::Ldi, rd, imm));
    }

    fn alu(&mut self, opcode: Opcode, rd: Reg, rs: Reg) {
        self.lines.push(format!("{} {}, {}", opcode, rd, rs));
    }

    fn st(&mut self, rd: Reg, addr: Byte) {
        self.lines
            .push(format!("{} {}, [{:#04X}]", Opcode::St, rd, addr));
    }

    fn branch(&mut self, opcode: Opcode, label: &str) {
        self.lines.push(format!("{} {}", opcode, label));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

pub fn lower(a: i64, b: i64, op: Operator) -> String {
    let mut asm = Emitter::default();

    match op.alu_opcode() {
        Some(opcode) => {
            asm.ldi(Reg::R0, a);
            asm.ldi(Reg::R1, b);
            asm.alu(opcode, Reg::R0, Reg::R1);
        }
        None => {
            asm.ldi(Reg::R0, 0);
            asm.ldi(Reg::R1, a);
            asm.ldi(Reg::R2, b);
            asm.ldi(Reg::R3, 1);

            asm.label(MUL_LOOP_LABEL);
            asm.alu(Opcode::Add, Reg::R0, Reg::R1);
            asm.alu(Opcode::Sub, Reg::R2, Reg::R3);
            asm.branch(Opcode::Brz, MUL_END_LABEL);
            asm.branch(Opcode::Jmp, MUL_LOOP_LABEL);

            asm.label(MUL_END_LABEL);
        }
    }

    asm.st(Reg::R0, RESULT_ADDR);
    asm.label(IDLE_LABEL);
    asm.branch(Opcode::Jmp, IDLE_LABEL);

    asm.finish()
}

/// Generates assembly source computing `a <op> b`, for an operator symbol among
/// `+ - & | ^ *`. Operands are not range checked; they wrap to 8 bits when assembled.
pub fn generate(a: i64, b: i64, op: &str) -> Result<String, Error> {
    let op = op.trim();
    let op = op
        .parse::<Operator>()
        .map_err(|_| Error::UnsupportedOperation(op.to_owned()))?;

    Ok(lower(a, b, op))
}
