//! This code does emulate the trap routines but does not implement them via
//! the opcodes of the LC-3 but directly.
//!
//! In the real system the code for these routines is at the target of the
//! [Trap Vector Tables](https://cs131.info/Assembly/Instructions/TRAPRoutines.html#trap-vector-table).
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use tracing::warn;

/// The six implemented trap service vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapVector {
    GetC = 0x20,
    Out = 0x21,
    PutS = 0x22,
    In = 0x23,
    PutSp = 0x24,
    Halt = 0x25,
}
impl TrapVector {
    /// Vectors outside the implemented range decode to `None`; the VM
    /// treats those as a no-op and keeps running.
    #[must_use]
    pub fn decode(vector: u16) -> Option<Self> {
        match vector {
            0x20 => Some(Self::GetC),
            0x21 => Some(Self::Out),
            0x22 => Some(Self::PutS),
            0x23 => Some(Self::In),
            0x24 => Some(Self::PutSp),
            0x25 => Some(Self::Halt),
            _ => None,
        }
    }
}

/// TRAP: saves the return address into R7, then runs the service routine
/// selected by the low eight instruction bits natively on the host.
/// ```text
///  15__12__11_8___7________0_
/// | 1111 | 0000 | trapvect8 |
///  --------------------------
/// ```
pub fn trap(
    i: Instruction,
    regs: &mut Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    regs.set(7, from_binary(regs.pc().as_binary()));
    let Some(vector) = TrapVector::decode(i.trap_vector()) else {
        warn!(vector = i.trap_vector(), "ignoring unknown trap vector");
        return ControlFlow::Continue(());
    };
    match vector {
        TrapVector::GetC => get_c(regs, memory),
        TrapVector::Out => out(regs, stdout),
        TrapVector::PutS => put_s(regs, memory, stdout),
        TrapVector::In => in_trap(regs, memory, stdout),
        TrapVector::PutSp => put_sp(regs, memory, stdout),
        TrapVector::Halt => halt(stdout),
    }
}

/// GETC: Read a single character from the keyboard. The character is not
/// echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(
    regs: &mut Registers,
    memory: &mut Memory,
) -> ControlFlow<Result<(), ExecutionError>> {
    let byte = match memory.keyboard_mut().read_blocking() {
        Ok(byte) => byte,
        Err(e) => return ControlFlow::Break(Err(e)),
    };
    regs.set(0, from_binary(byte & 0xFF));
    regs.update_conditional_register(0);
    ControlFlow::Continue(())
}

/// IN: Print a prompt on the screen and read a single character echoed back
/// from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("Enter character: ", stdout)?;
    let byte = match memory.keyboard_mut().read_blocking() {
        Ok(byte) => byte,
        Err(e) => return ControlFlow::Break(Err(e)),
    };
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Truncation to the low byte is what is expected here"
    )]
    let echo = [(byte & 0xFF) as u8];
    write_str_out(String::from_utf8_lossy(&echo).as_ref(), stdout)?;
    regs.set(0, from_binary(byte & 0xFF));
    regs.update_conditional_register(0);
    ControlFlow::Continue(())
}

/// OUT: Write a character in R0\[7:0\] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    let c: char = (regs.get(0).as_binary() & 0xFF) as u8 as char;
    write_str_out(&String::from(c), stdout)
}

fn put_one_char_per_u16(input: u16, append_to: &mut String) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Truncation is what is expected here"
    )]
    let c = (input as u8) as char;
    append_to.push(c);
}

fn put_two_chars_per_u16(input: u16, append_to: &mut String) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Truncation is what is expected here"
    )]
    let c = (input as u8) as char;
    append_to.push(c);
    let c = ((input >> 8) as u8) as char;
    if c != '\0' {
        append_to.push(c);
    }
}

fn put(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
    handle_char: fn(u16, &mut String),
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut s = String::with_capacity(120);
    loop {
        let word = mem.read(address);
        if word == 0 {
            break;
        }
        handle_char(word, &mut s);
        address = address.wrapping_add(1);
    }
    write_str_out(s.as_str(), stdout)
}

/// PUTS: print null-delimited char* from register 0's address, one
/// character per word
pub fn put_s(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits \[7:0\] of a memory location is written
/// to the console first, then the one in bits \[15:8\]. The second character
/// of the last memory location can be 0x00. Writing terminates with a
/// 0x0000 word.
pub fn put_sp(
    regs: &Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: End program and stdout a message
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("HALT\n", stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_str_out(
    message: &str,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match stdout
        .write_all(message.as_bytes())
        .and_then(|()| stdout.flush())
    {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, ()> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
