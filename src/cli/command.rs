use crate::artifact::{frame, hex};
use crate::assembler::{self, disasm};
use crate::calc;
use ansi_term::Color::{Green, Red};
use anyhow::{Context, Result};
use log::info;
use serialport::SerialPort;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use structopt::{clap::AppSettings, StructOpt};

pub const DEFAULT_HEX_EXT: &str = "hex";

const LINK_TIMEOUT: Duration = Duration::from_secs(2);

pub fn terminal_init() {
    env_logger::init();

    #[cfg(windows)]
    {
        if ansi_term::enable_ansi_support().is_err() {
            log::warn!("could not enable terminal ANSI support");
        }
    }
}

fn read_source_path(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("could not read source file '{}'", path.display()))
}

pub fn assemble_path(path: &Path) -> Result<Vec<u8>> {
    let prog_src = read_source_path(path)?;
    assembler::assemble(&prog_src).with_context(|| format!("in '{}'", path.display()))
}

pub fn read_hex_path(path: &Path) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read hex artifact '{}'", path.display()))?;
    hex::parse(&text).with_context(|| format!("in '{}'", path.display()))
}

fn load_program(path: &Path, is_hex: bool) -> Result<Vec<u8>> {
    if is_hex {
        read_hex_path(path)
    } else {
        assemble_path(path)
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "cpu8")]
pub enum CommandRoot {
    Asm(SubcommandAsm),
    Calc(SubcommandCalc),
    Send(SubcommandSend),
    Disasm(SubcommandDisasm),
}

/// Assemble a source file into a hex artifact
#[derive(StructOpt, Debug)]
#[structopt(name = "c8asm")]
pub struct SubcommandAsm {
    #[structopt(name = "in.s", parse(from_os_str))]
    in_src: PathBuf,

    #[structopt(name = "out.hex", parse(from_os_str))]
    out_hex: Option<PathBuf>,

    /// Print the artifact instead of writing it
    #[structopt(short, long)]
    print: bool,

    /// Also print the address of every label
    #[structopt(short, long)]
    labels: bool,
}

/// Generate a program computing `a op b`
#[derive(StructOpt, Debug)]
#[structopt(setting = AppSettings::AllowNegativeNumbers)]
pub struct SubcommandCalc {
    a: i64,

    /// One of + - & | ^ *
    op: String,

    b: i64,

    #[structopt(short, long, parse(from_os_str))]
    out: Option<PathBuf>,

    /// Emit the assembled hex artifact rather than the source
    #[structopt(long)]
    hex: bool,
}

/// Frame a program and send it over a serial link
#[derive(StructOpt, Debug)]
pub struct SubcommandSend {
    #[structopt(name = "in.s", parse(from_os_str))]
    in_file: PathBuf,

    #[structopt(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    #[structopt(short, long, default_value = "115200")]
    baud: u32,

    /// Treat the input as a hex artifact rather than source
    #[structopt(long)]
    hex: bool,
}

/// List the instructions in a hex artifact
#[derive(StructOpt, Debug)]
pub struct SubcommandDisasm {
    #[structopt(name = "in.hex", parse(from_os_str))]
    in_file: PathBuf,

    /// Treat the input as source, assembling it first
    #[structopt(long)]
    source: bool,
}

pub fn exit_with(result: Result<()>) -> ! {
    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("{}: {:#}", Red.bold().paint("Error"), err);
            std::process::exit(1);
        }
    }
}

pub fn root(cmd: CommandRoot) -> Result<()> {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Calc(scmd) => calc(scmd),
        CommandRoot::Send(scmd) => send(scmd),
        CommandRoot::Disasm(scmd) => disasm(scmd),
    }
}

fn write_or_print(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        None => print!("{}", text),
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("could not write '{}'", path.display()))?;
            info!("wrote '{}'", path.display());
        }
    }

    Ok(())
}

fn print_labels(path: &Path) -> Result<()> {
    let labels = assembler::resolve_labels(&read_source_path(path)?)
        .with_context(|| format!("in '{}'", path.display()))?;

    for (name, addr) in labels.iter() {
        println!("{:#04X}  {}", addr, name);
    }
    Ok(())
}

pub fn asm(cmd: SubcommandAsm) -> Result<()> {
    let program = assemble_path(&cmd.in_src)?;
    let artifact = hex::serialize(&program);

    if cmd.labels {
        print_labels(&cmd.in_src)?;
    }

    if cmd.print {
        return write_or_print(None, &artifact);
    }

    let out_name = match cmd.out_hex {
        Some(path) => path,
        None => cmd.in_src.with_extension(DEFAULT_HEX_EXT),
    };
    write_or_print(Some(&out_name), &artifact)?;

    println!(
        "{} '{}' saved ({} bytes)",
        Green.bold().paint("OK"),
        out_name.display(),
        program.len()
    );
    Ok(())
}

pub fn calc(cmd: SubcommandCalc) -> Result<()> {
    let source = calc::generate(cmd.a, cmd.b, &cmd.op)?;

    let text = if cmd.hex {
        hex::serialize(&assembler::assemble(&source)?)
    } else {
        source + "\n"
    };

    write_or_print(cmd.out.as_deref(), &text)
}

/// Opens `port` as a serial line running at `baud`, 8N1.
pub fn open_link(port: &str, baud: u32) -> Result<Box<dyn SerialPort>> {
    serialport::new(port, baud)
        .timeout(LINK_TIMEOUT)
        .open()
        .with_context(|| format!("could not open port '{}' at {} baud", port, baud))
}

pub fn send(cmd: SubcommandSend) -> Result<()> {
    let program = load_program(&cmd.in_file, cmd.hex)?;

    info!(
        "sending {} bytes to '{}' at {} baud",
        program.len(),
        cmd.port,
        cmd.baud
    );
    let mut link = open_link(&cmd.port, cmd.baud)?;
    frame::send(&mut link, &program)?;

    println!(
        "{} program of {} bytes sent to '{}'",
        Green.bold().paint("OK"),
        program.len(),
        cmd.port
    );
    Ok(())
}

pub fn disasm(cmd: SubcommandDisasm) -> Result<()> {
    let program = load_program(&cmd.in_file, !cmd.source)?;
    let insts = disasm::disassemble(&program)?;

    println!("{}", disasm::listing(&insts));
    Ok(())
}
