use derive_more::Constructor;
use std::fmt::Display;

/*
    Phases:

        1.  Tokenization: Each source line is stripped of its comment (from ';' to the end of
            the line) and surrounding whitespace. Blank lines are dropped. A line ending in ':'
            becomes a `Statement::LabelDef`, anything else is split at commas and whitespace
            into a `Statement::Inst` holding the mnemonic and its raw operand tokens.

        2.  Resolution (pass 1): The statements are walked in order with a running program
            counter. Label definitions record the counter, instructions advance it by the
            length their mnemonic implies. This yields the `LabelTable`.

        3.  Generation (pass 2): The statements are walked again, with the same running
            program counter, and each instruction is encoded against the `LabelTable`. The
            counter advances by the number of bytes actually emitted, and each emitted length
            is checked against the one pass 1 assumed.

        4.  Concatenation: The encoded instructions are concatenated in source order to give
            the final program.

    Each phase runs over the whole source before the next one starts, so the
    reported error is the first one of the earliest failing phase. A malformed label
    definition anywhere therefore wins over an unknown instruction on an earlier line.

    Operands stay as raw strings until generation, since whether a token is a register, a
    label reference or a numeric literal is only known once the mnemonic is.
*/

pub type LabelName = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    LabelDef(LabelName),
    Inst(String, Vec<String>),
}

#[derive(Debug, PartialEq, Clone, Copy, Eq, Constructor)]
pub struct Loc {
    line: usize,
    col: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Located<T: Sized> {
    loc: Option<Loc>,
    val: T,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            None => write!(f, "@<unknown location>: {}", self.val),
            Some(loc) => write!(f, "@{}: {}", loc, self.val),
        }
    }
}

impl<T> Located<T> {
    fn new(loc: Option<Loc>, val: T) -> Self {
        Located { loc, val }
    }

    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located::new(Some(loc), val)
    }

    pub fn loc(&self) -> Option<Loc> {
        self.loc
    }

    pub fn value(&self) -> &T {
        &self.val
    }

    pub fn map_result_value<S, E, F>(&self, f: F) -> Result<S, Located<E>>
    where
        F: FnOnce(&T) -> Result<S, E>,
    {
        f(&self.val).map_err(|err| Located::new(self.loc, err))
    }
}

impl<T> From<T> for Located<T> {
    fn from(val: T) -> Self {
        Located { loc: None, val }
    }
}
