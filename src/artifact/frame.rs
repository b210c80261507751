use crate::spec::types::hw::Byte;
use log::debug;
use std::convert::TryFrom;
use std::fmt::Display;
use std::io::{self, Write};

/*
    Programs travel to the board in a single frame:

        0x55 0xAA LEN_H LEN_L <LEN data bytes>

    where LEN is the big-endian 16-bit payload length.
*/

pub const SYNC: [Byte; 2] = [0x55, 0xAA];
pub const HEADER_LEN: usize = SYNC.len() + 2;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    EmptyProgram,
    TooLarge(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyProgram => write!(f, "Program is empty"),
            Error::TooLarge(len) => write!(
                f,
                "Program of {} bytes does not fit in a frame (at most {} bytes)",
                len,
                u16::MAX
            ),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug)]
pub enum SendError {
    Frame(Error),
    Io(io::Error),
}

impl From<Error> for SendError {
    fn from(err: Error) -> Self {
        SendError::Frame(err)
    }
}

impl From<io::Error> for SendError {
    fn from(err: io::Error) -> Self {
        SendError::Io(err)
    }
}

impl Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::Frame(err) => write!(f, "{}", err),
            SendError::Io(err) => write!(f, "Link error: {}", err),
        }
    }
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SendError::Frame(err) => Some(err),
            SendError::Io(err) => Some(err),
        }
    }
}

pub fn frame(data: &[Byte]) -> Result<Vec<Byte>, Error> {
    if data.is_empty() {
        return Err(Error::EmptyProgram);
    }

    let len = u16::try_from(data.len()).map_err(|_| Error::TooLarge(data.len()))?;

    let mut framed = Vec::with_capacity(HEADER_LEN + data.len());
    framed.extend_from_slice(&SYNC);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(data);
    Ok(framed)
}

/// Frames `data` and writes it to `link`. Nothing is written unless framing succeeds.
pub fn send(link: &mut impl Write, data: &[Byte]) -> Result<(), SendError> {
    let framed = frame(data)?;
    debug!("sending frame of {} bytes", framed.len());

    link.write_all(&framed)?;
    link.flush()?;
    Ok(())
}
