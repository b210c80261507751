use super::types::{Loc, Located, Statement};
use crate::common;
use std::fmt::Display;

pub const COMMENT_CHAR: char = ';';
pub const LABEL_DEF_CHAR: char = ':';
const SEPARATOR_CHAR: char = ',';

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    MalformedLabel(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedLabel(name) => write!(
                f,
                "Malformed label definition '{}{}': label names must be identifiers",
                name, LABEL_DEF_CHAR
            ),
        }
    }
}

/// Removes a trailing comment and any surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(idx) => &line[..idx],
        None => line,
    }
    .trim()
}

/// Operands may be separated by any mix of commas and whitespace.
pub fn split_tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == SEPARATOR_CHAR || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

impl Statement {
    /// Classifies one comment-stripped line. Lines with no tokens give `None`.
    pub fn parse_line(line: &str) -> Result<Option<Statement>, Error> {
        if line.ends_with(LABEL_DEF_CHAR) {
            let name = line[..line.len() - LABEL_DEF_CHAR.len_utf8()].trim();
            if !common::is_identifier(name) {
                return Err(Error::MalformedLabel(name.to_owned()));
            }

            return Ok(Some(Statement::LabelDef(name.to_owned())));
        }

        let mut tokens = split_tokens(line);
        Ok(tokens.next().map(|mnemonic| {
            Statement::Inst(mnemonic.to_owned(), tokens.map(str::to_owned).collect())
        }))
    }
}

fn leading_col(raw: &str) -> usize {
    raw.chars().take_while(|c| c.is_whitespace()).count() + 1
}

pub fn tokenize(source: &str) -> Result<Vec<Located<Statement>>, Located<Error>> {
    let mut stmts = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let loc = Loc::new(idx + 1, leading_col(raw));
        if let Some(stmt) = Statement::parse_line(strip_comment(raw))
            .map_err(|err| Located::with_loc(loc, err))?
        {
            stmts.push(Located::with_loc(loc, stmt));
        }
    }

    Ok(stmts)
}
