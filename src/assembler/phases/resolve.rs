use super::types::{LabelName, Located, Statement};
use crate::spec::{
    defs::inst::InstSet,
    types::hw::{byte_from_usize_wrapping, Byte},
};
use log::{debug, trace};
use std::collections::{btree_map::Entry, BTreeMap};
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    DuplicateLabel(LabelName),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateLabel(label) => write!(f, "Duplicate label: '{}'", label),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<LabelName, Byte>,
}

impl LabelTable {
    pub fn get(&self, label: &str) -> Option<Byte> {
        self.labels.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Byte)> {
        self.labels.iter().map(|(name, addr)| (name.as_str(), *addr))
    }

    fn define(&mut self, label: &str, pc: usize) -> Result<(), Error> {
        match self.labels.entry(label.to_owned()) {
            Entry::Occupied(_) => Err(Error::DuplicateLabel(label.to_owned())),
            Entry::Vacant(slot) => {
                trace!("label '{}' at {:#04X}", label, pc);
                slot.insert(byte_from_usize_wrapping(pc));
                Ok(())
            }
        }
    }
}

impl Statement {
    /// The number of bytes this statement occupies, judged from the mnemonic alone.
    pub(crate) fn assumed_len(&self) -> usize {
        match self {
            Statement::LabelDef(_) => 0,
            Statement::Inst(mnemonic, _) => InstSet::get().inst_len(mnemonic),
        }
    }
}

pub fn resolve(stmts: &[Located<Statement>]) -> Result<LabelTable, Located<Error>> {
    let mut table = LabelTable::default();

    let mut pc = 0;
    for stmt in stmts {
        if let Statement::LabelDef(label) = stmt.value() {
            stmt.map_result_value(|_| table.define(label, pc))?;
        }

        pc += stmt.value().assumed_len();
    }

    debug!("resolved {} labels over {} bytes", table.len(), pc);
    Ok(table)
}
