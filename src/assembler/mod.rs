pub mod disasm;
pub mod phases;

pub use phases::resolve::LabelTable;

use crate::spec::types::hw::Byte;
use log::debug;
use phases::{
    generate, resolve, tokenize,
    types::{Located, Statement},
};
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Tokenize(Located<tokenize::Error>),
    Resolve(Located<resolve::Error>),
    Generate(Located<generate::Error>),
}

impl From<Located<tokenize::Error>> for Error {
    fn from(err: Located<tokenize::Error>) -> Self {
        Error::Tokenize(err)
    }
}

impl From<Located<resolve::Error>> for Error {
    fn from(err: Located<resolve::Error>) -> Self {
        Error::Resolve(err)
    }
}

impl From<Located<generate::Error>> for Error {
    fn from(err: Located<generate::Error>) -> Self {
        Error::Generate(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assembly Error (in ")?;
        match self {
            Error::Tokenize(_) => write!(f, "Tokenizer"),
            Error::Resolve(_) => write!(f, "Resolver"),
            Error::Generate(_) => write!(f, "Generator"),
        }?;
        write!(f, "): ")?;
        match self {
            Error::Tokenize(err) => write!(f, "{}", err),
            Error::Resolve(err) => write!(f, "{}", err),
            Error::Generate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

/// Builds the label table for `source` without encoding anything.
pub fn resolve_labels(source: &str) -> Result<LabelTable, Error> {
    let stmts = phases::tokenize(source)?;
    Ok(phases::resolve(&stmts)?)
}

/// Encodes a single line as if it sat at address `pc`. Blank lines, comments and
/// label definitions encode to nothing. Lines are classified exactly as `assemble`
/// classifies them, so a malformed label definition is still an error.
pub fn encode_line(line: &str, labels: &LabelTable, pc: usize) -> Result<Vec<Byte>, Error> {
    let stmt = Statement::parse_line(tokenize::strip_comment(line))
        .map_err(|err| Error::Tokenize(err.into()))?;

    match stmt {
        Some(Statement::Inst(mnemonic, operands)) => {
            generate::encode(&mnemonic, &operands, labels, pc)
                .map_err(|err| Error::Generate(err.into()))
        }
        Some(Statement::LabelDef(_)) | None => Ok(vec![]),
    }
}

pub fn assemble(source: &str) -> Result<Vec<Byte>, Error> {
    let stmts = phases::tokenize(source)?;
    let labels = phases::resolve(&stmts)?;
    let bytes = phases::generate(&stmts, &labels)?;

    debug!(
        "assembled {} statements into {} bytes",
        stmts.len(),
        bytes.len()
    );
    Ok(bytes)
}
