use crate::spec::types::hw::Byte;
use std::fmt::Display;

/*
    The hex artifact holds one byte per line, as exactly two uppercase hexadecimal
    digits, in program order:

        10
        05
        12
        0A
*/

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    MalformedLine(usize, String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedLine(line, text) => write!(
                f,
                "Malformed hex artifact line {}: '{}', expected two hex digits",
                line, text
            ),
        }
    }
}

impl std::error::Error for Error {}

pub fn serialize(program: &[Byte]) -> String {
    program.iter().map(|b| format!("{:02X}\n", b)).collect()
}

/// Reads an artifact back. Surrounding whitespace and blank lines are tolerated,
/// lowercase digits are not.
pub fn parse(text: &str) -> Result<Vec<Byte>, Error> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(num, line)| {
            let well_formed = line.len() == 2
                && line
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));
            let byte = if well_formed {
                Byte::from_str_radix(line, 16).ok()
            } else {
                None
            };
            byte.ok_or_else(|| Error::MalformedLine(num, line.to_owned()))
        })
        .collect()
}
