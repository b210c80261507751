#![allow(dead_code)]

use cpu8::assembler;

pub fn assemble_ok(src: &str) -> Vec<u8> {
    match assembler::assemble(src) {
        Ok(bytes) => bytes,
        Err(err) => panic!("{}\n--- source ---\n{}", err, src),
    }
}

// A reference model of the CPU, just detailed enough to check what generated
// programs compute. ALU instructions set the zero flag, nothing else touches it.
pub struct Machine {
    pub regs: [u8; 8],
    pub mem: [u8; 256],
    pub zero: bool,
    pub pc: u8,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Stop {
    Idle,
    OutOfSteps,
}

impl Machine {
    pub fn new() -> Machine {
        Machine {
            regs: [0; 8],
            mem: [0; 256],
            zero: false,
            pc: 0,
        }
    }

    fn fetch(&self, prog: &[u8], addr: u8) -> u8 {
        prog.get(usize::from(addr)).copied().unwrap_or(0)
    }

    /// Runs until the program jumps to itself, which is how generated programs idle.
    pub fn run(&mut self, prog: &[u8], max_steps: usize) -> Stop {
        for _ in 0..max_steps {
            let b0 = self.fetch(prog, self.pc);
            let op = b0 >> 4;
            let rd = usize::from((b0 >> 1) & 0x07);

            if op == 0x0 {
                self.pc = self.pc.wrapping_add(1);
                continue;
            }

            let b1 = self.fetch(prog, self.pc.wrapping_add(1));
            let next = self.pc.wrapping_add(2);
            let rs = usize::from(b1 & 0x07);

            let alu = |f: fn(u8, u8) -> u8, regs: &mut [u8; 8]| {
                regs[rd] = f(regs[rd], regs[rs]);
                regs[rd] == 0
            };

            match op {
                0x1 => self.regs[rd] = b1,
                0x2 => self.zero = alu(u8::wrapping_add, &mut self.regs),
                0x3 => self.zero = alu(u8::wrapping_sub, &mut self.regs),
                0x4 => self.zero = alu(|a, b| a & b, &mut self.regs),
                0x5 => self.zero = alu(|a, b| a | b, &mut self.regs),
                0x6 => self.zero = alu(|a, b| a ^ b, &mut self.regs),
                0x7 => self.regs[rd] = self.mem[usize::from(b1)],
                0x8 => self.mem[usize::from(b1)] = self.regs[rd],
                0x9 => {
                    if self.zero {
                        self.pc = next.wrapping_add(b1);
                        continue;
                    }
                }
                0xA => {
                    if b1 == self.pc {
                        return Stop::Idle;
                    }
                    self.pc = b1;
                    continue;
                }
                _ => panic!("invalid opcode {:#04X} at {:#04X}", b0, self.pc),
            }

            self.pc = next;
        }

        Stop::OutOfSteps
    }
}
