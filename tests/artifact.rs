mod common;

use common::assemble_ok;
use cpu8::artifact::{
    frame::{self, SendError},
    hex,
};
use cpu8::calc;
use std::io::{self, Write};

#[test]
fn hex_has_one_uppercase_byte_per_line() {
    assert_eq!(hex::serialize(&[0x00, 0xAB, 0x07, 0xFF]), "00\nAB\n07\nFF\n");
    assert_eq!(hex::serialize(&[]), "");
}

#[test]
fn hex_preserves_every_byte_in_order() {
    let program = assemble_ok(&calc::generate(9, 4, "*").unwrap());
    let text = hex::serialize(&program);

    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), program.len());
    for (line, byte) in lines.iter().zip(&program) {
        assert_eq!(line.len(), 2);
        assert_eq!(u8::from_str_radix(line, 16).unwrap(), *byte);
    }

    assert_eq!(hex::parse(&text), Ok(program));
}

#[test]
fn hex_parse_tolerates_blank_lines_and_whitespace() {
    assert_eq!(hex::parse("10\n\n  05  \r\nA0\n"), Ok(vec![0x10, 0x05, 0xA0]));
}

#[test]
fn hex_parse_rejects_malformed_lines() {
    assert_eq!(
        hex::parse("10\n0G\n"),
        Err(hex::Error::MalformedLine(2, "0G".to_owned()))
    );
    assert_eq!(
        hex::parse("ab"),
        Err(hex::Error::MalformedLine(1, "ab".to_owned()))
    );
    assert_eq!(
        hex::parse("100"),
        Err(hex::Error::MalformedLine(1, "100".to_owned()))
    );
    assert_eq!(
        hex::parse("+F"),
        Err(hex::Error::MalformedLine(1, "+F".to_owned()))
    );
}

#[test]
fn frame_prefixes_sync_and_big_endian_length() {
    assert_eq!(
        frame::frame(&[0x11, 0x22, 0x33]),
        Ok(vec![0x55, 0xAA, 0x00, 0x03, 0x11, 0x22, 0x33])
    );

    let data = vec![0xEEu8; 300];
    let framed = frame::frame(&data).unwrap();
    assert_eq!(framed[..4], [0x55, 0xAA, 0x01, 0x2C]);
    assert_eq!(framed[4..], data[..]);
}

#[test]
fn frame_rejects_empty_and_oversized_programs() {
    assert_eq!(frame::frame(&[]), Err(frame::Error::EmptyProgram));
    assert_eq!(
        frame::frame(&vec![0u8; 0x1_0000]),
        Err(frame::Error::TooLarge(0x1_0000))
    );
    assert!(frame::frame(&vec![0u8; 0xFFFF]).is_ok());
}

#[test]
fn send_writes_exactly_the_frame() {
    let mut link: Vec<u8> = Vec::new();
    frame::send(&mut link, &[0x11, 0x22, 0x33]).unwrap();
    assert_eq!(link, vec![0x55, 0xAA, 0x00, 0x03, 0x11, 0x22, 0x33]);
}

#[test]
fn sending_an_empty_program_writes_nothing() {
    let mut link: Vec<u8> = Vec::new();
    let result = frame::send(&mut link, &[]);

    assert!(matches!(
        result,
        Err(SendError::Frame(frame::Error::EmptyProgram))
    ));
    assert!(link.is_empty());
}

struct BrokenLink;

impl Write for BrokenLink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn link_failures_are_reported() {
    let err = frame::send(&mut BrokenLink, &[0x00]).unwrap_err();
    assert!(matches!(err, SendError::Io(_)));
    assert_eq!(err.to_string(), "Link error: unplugged");
}
