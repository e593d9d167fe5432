//! The emulator core: machine state, instruction dispatch and the
//! fetch-decode-execute loop.

use crate::emulator::image::Image;
use crate::emulator::instruction::{Instruction, OpCode};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::info;

pub mod image;
pub mod instruction;
mod opcodes;
pub mod trap_routines;

#[cfg(test)]
pub(crate) mod test_helpers;

/// Creates an emulator with terminal keyboard input and the given image
/// files installed in order. Later images overwrite earlier ones at
/// overlapping addresses.
///
/// # Errors
/// - any image file cannot be read or decoded
pub fn from_image_files(paths: &[impl AsRef<Path>]) -> Result<Emulator, LoadProgramError> {
    let mut emulator = Emulator::new();
    for path in paths {
        info!(path = %path.as_ref().display(), "loading image");
        emulator.load_image_file(path)?;
    }
    Ok(emulator)
}

/// The public facing emulator used to run LC-3 programs.
///
/// Bundles the word-addressed memory (which owns the keyboard mailbox), the
/// register file and the running flag. Created once at startup, mutated only
/// by the image loader and the execution loop.
pub struct Emulator {
    pub(crate) memory: Memory,
    pub(crate) registers: Registers,
    running: bool,
}
impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
impl Emulator {
    /// Constructor method, initial state per the LC-3 architecture.
    /// Keyboard input comes from the hosting terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keyboard(Keyboard::spawn_terminal_reader())
    }

    /// Constructor with an injectable keyboard, the seam used by tests and
    /// embedders that provide their own input source.
    #[must_use]
    pub fn with_keyboard(keyboard: Keyboard) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            running: false,
        }
    }

    /// Reads an image file and installs it into memory.
    ///
    /// # Errors
    /// - image file cannot be read or decoded
    pub fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadProgramError> {
        let image = Image::read_file(path)?;
        self.load_image(&image);
        Ok(())
    }

    /// Installs an already decoded image into memory.
    pub fn load_image(&mut self, image: &Image) {
        image.install_into(&mut self.memory);
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Puts the register file back into its initial state so a loaded image
    /// can be executed again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Runs the fetch-decode-execute loop against stdout until the program
    /// halts.
    ///
    /// # Errors
    /// - a reserved opcode is executed
    /// - host input or output fails
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        self.execute_with_output(&mut io::stdout())
    }

    /// Like [`Emulator::execute`], but trap output goes to the given writer.
    ///
    /// # Errors
    /// - see [`Emulator::execute`]
    pub fn execute_with_output<W: Write>(&mut self, stdout: &mut W) -> Result<(), ExecutionError> {
        self.running = true;
        while self.running {
            if let ControlFlow::Break(result) = self.step(stdout) {
                self.running = false;
                result?;
            }
        }
        Ok(())
    }

    /// One iteration of the loop: fetch through the memory bus, advance PC
    /// past the instruction, decode and dispatch.
    pub(crate) fn step<W: Write>(
        &mut self,
        stdout: &mut W,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        let instruction = Instruction::from(self.memory.read(self.registers.pc().as_binary()));
        self.registers.inc_pc();
        let op_code = instruction.op_code();
        match op_code {
            OpCode::Br => opcodes::br(instruction, &mut self.registers),
            OpCode::Add => opcodes::add(instruction, &mut self.registers),
            OpCode::Ld => opcodes::ld(instruction, &mut self.registers, &mut self.memory),
            OpCode::St => opcodes::st(instruction, &self.registers, &mut self.memory),
            OpCode::Jsr => opcodes::jsr(instruction, &mut self.registers),
            OpCode::And => opcodes::and(instruction, &mut self.registers),
            OpCode::Ldr => opcodes::ldr(instruction, &mut self.registers, &mut self.memory),
            OpCode::Str => opcodes::str(instruction, &self.registers, &mut self.memory),
            OpCode::Not => opcodes::not(instruction, &mut self.registers),
            OpCode::Ldi => opcodes::ldi(instruction, &mut self.registers, &mut self.memory),
            OpCode::Sti => opcodes::sti(instruction, &self.registers, &mut self.memory),
            OpCode::Jmp => opcodes::jmp(instruction, &mut self.registers),
            OpCode::Lea => opcodes::lea(instruction, &mut self.registers),
            OpCode::Rti | OpCode::Res => {
                return ControlFlow::Break(Err(ExecutionError::ReservedInstructionFound(
                    instruction.get_bit_range_u8(12, 15, "an opcode is four bits"),
                )));
            }
            OpCode::Trap => {
                return trap_routines::trap(
                    instruction,
                    &mut self.registers,
                    &mut self.memory,
                    stdout,
                );
            }
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::FakeEmulator;
    use super::*;
    use crate::hardware::registers::{ConditionFlag, PC_START, from_binary};
    use googletest::prelude::*;

    #[gtest]
    pub fn test_add_immediate_positive() {
        // ADD R0 <- R0 + 3
        let mut emu = FakeEmulator::new(&[0x1023], "");
        assert!(emu.step().is_continue());
        expect_that!(emu.registers().get(0), eq(from_binary(3)));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Pos)
        );
        expect_that!(emu.registers().pc(), eq(from_binary(0x3001)));
    }
    #[gtest]
    pub fn test_add_immediate_negative() {
        // ADD R0 <- R0 + (-1)
        let mut emu = FakeEmulator::new(&[0x103F], "");
        assert!(emu.step().is_continue());
        expect_that!(emu.registers().get(0), eq(from_binary(0xFFFF)));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Neg)
        );
    }
    #[gtest]
    pub fn test_lea_then_ldi() {
        // LEA R0, #1 then LDI R1, #0 with the pointer chain in a second image
        let mut emu = FakeEmulator::new(&[0xE001, 0xA200, 0x4000], "");
        emu.load_words_at(0x4000, &[0x1234]);
        assert!(emu.step().is_continue());
        assert!(emu.step().is_continue());
        expect_that!(emu.registers().get(0), eq(from_binary(0x3002)));
        expect_that!(emu.registers().get(1), eq(from_binary(0x1234)));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Pos)
        );
    }
    #[gtest]
    pub fn test_br_taken_on_zero() {
        // BR z, PCoffset9: 3; the condition register starts out as zero
        let mut emu = FakeEmulator::new(&[0x0403], "");
        assert!(emu.step().is_continue());
        expect_that!(emu.registers().pc(), eq(from_binary(0x3004)));
    }
    #[gtest]
    pub fn test_jsr_long_and_ret() {
        let mut emu = FakeEmulator::new(&[0x4802, 0, 0, 0xC1C0], "");
        // JSR with PCoffset11: 2
        assert!(emu.step().is_continue());
        expect_that!(emu.registers().get(7), eq(from_binary(0x3001)));
        expect_that!(emu.registers().pc(), eq(from_binary(0x3003)));
        // JMP R7 == RET
        assert!(emu.step().is_continue());
        expect_that!(emu.registers().pc(), eq(from_binary(0x3001)));
    }
    #[gtest]
    pub fn test_puts_program() {
        // LEA R0, #2; TRAP PUTS; TRAP HALT; "Hi!\0"
        let words = [
            0xE002,
            0xF022,
            0xF025,
            u16::from(b'H'),
            u16::from(b'i'),
            u16::from(b'!'),
            0,
        ];
        let mut emu = FakeEmulator::new(&words, "");
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("Hi!HALT\n"));
        expect_that!(emu.is_running(), eq(false));
    }
    #[gtest]
    pub fn test_halt_stops_the_loop() {
        let mut emu = FakeEmulator::new(&[0xF025, 0x1023], "");
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("HALT\n"));
        expect_that!(emu.is_running(), eq(false));
        // the instruction behind the HALT never ran
        expect_that!(emu.registers().get(0), eq(from_binary(0)));
        expect_that!(emu.registers().pc(), eq(from_binary(0x3001)));
    }
    #[gtest]
    pub fn test_getc_program() {
        // TRAP GETC; TRAP HALT
        let mut emu = FakeEmulator::new(&[0xF020, 0xF025], "a");
        emu.execute().unwrap();
        expect_that!(emu.registers().get(0), eq(from_binary(u16::from(b'a'))));
        expect_that!(emu.output(), eq("HALT\n"));
    }
    #[gtest]
    pub fn test_keyboard_status_polling_program() {
        // LDI R0, #2 reads through the keyboard status register
        let mut emu = FakeEmulator::new(&[0xA002, 0xF025, 0x0000, 0xFE00], "z");
        emu.execute().unwrap();
        expect_that!(emu.registers().get(0), eq(from_binary(0x8000)));
        // the consumed byte is observable in the keyboard data register
        let (_regs, mem, _writer) = emu.get_parts();
        expect_that!(mem.read(0xFE02), eq(u16::from(b'z')));
    }
    #[gtest]
    pub fn test_reserved_opcodes_fault() {
        let mut emu = FakeEmulator::new(&[0x8000], "");
        expect_that!(
            emu.execute().unwrap_err(),
            eq(&ExecutionError::ReservedInstructionFound(0x8))
        );
        expect_that!(emu.is_running(), eq(false));

        let mut emu = FakeEmulator::new(&[0xD000], "");
        expect_that!(
            emu.execute().unwrap_err(),
            eq(&ExecutionError::ReservedInstructionFound(0xD))
        );
    }
    #[gtest]
    pub fn test_unknown_trap_vector_keeps_running() {
        let mut emu = FakeEmulator::new(&[0xF0FF, 0xF025], "");
        emu.execute().unwrap();
        expect_that!(emu.output(), eq("HALT\n"));
    }
    #[gtest]
    pub fn test_condition_register_has_exactly_one_flag_after_each_step() {
        // a small program exercising ALU, load and LEA flag updates
        let words = [0x1023, 0x103F, 0x5020, 0xE001, 0xF025];
        let mut emu = FakeEmulator::new(&words, "");
        for _ in 0..4 {
            assert!(emu.step().is_continue());
            let flag = emu.registers().get_conditional_register();
            expect_that!(
                (flag as u16).count_ones(),
                eq(1),
                "flag {flag:?} must have exactly one bit set"
            );
        }
    }
    #[gtest]
    pub fn test_reset_registers_allows_rerun() {
        let mut emu = FakeEmulator::new(&[0x1023, 0xF025], "");
        emu.execute().unwrap();
        expect_that!(emu.registers().get(0), eq(from_binary(3)));
        emu.reset_registers();
        expect_that!(emu.registers().pc(), eq(from_binary(PC_START)));
        emu.execute().unwrap();
        expect_that!(emu.registers().get(0), eq(from_binary(3)));
        expect_that!(emu.output(), eq("HALT\nHALT\n"));
    }
}
