pub(crate) mod common;

pub mod spec;

pub mod assembler;
pub mod calc;

pub mod artifact;

pub mod cli;
