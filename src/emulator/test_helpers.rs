use crate::emulator::Emulator;
use crate::emulator::image::Image;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::Keyboard;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{PC_START, Registers};
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::sync::mpsc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Emulator wired up for tests: program words land at the default origin
/// through the real image decoder, keyboard input is scripted through a
/// channel and trap output is captured in a [`StringWriter`].
pub struct FakeEmulator {
    inner: Emulator,
    stdout: StringWriter,
    keyboard_input_sender: Option<mpsc::Sender<u16>>,
}
impl FakeEmulator {
    pub fn new(program_words: &[u16], stdin_data: &str) -> Self {
        let (keyboard_input_sender, receiver) = mpsc::channel();
        for byte in stdin_data.bytes() {
            keyboard_input_sender
                .send(u16::from(byte))
                .expect("receiver is alive");
        }
        let mut inner = Emulator::with_keyboard(Keyboard::from_receiver(receiver));
        let image = Image::from_bytes(&Self::image_bytes(PC_START, program_words))
            .expect("test image must decode");
        inner.load_image(&image);
        Self {
            inner,
            stdout: StringWriter::new(),
            keyboard_input_sender: Some(keyboard_input_sender),
        }
    }

    fn image_bytes(origin: u16, words: &[u16]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((words.len() + 1) * 2);
        bytes.extend_from_slice(&origin.to_be_bytes());
        for word in words {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Installs additional words as a second image at the given origin.
    pub fn load_words_at(&mut self, origin: u16, words: &[u16]) {
        let image =
            Image::from_bytes(&Self::image_bytes(origin, words)).expect("test image must decode");
        self.inner.load_image(&image);
    }

    /// Drops the keyboard sender so blocking reads fail immediately.
    pub fn disconnect_keyboard(&mut self) {
        self.keyboard_input_sender = None;
    }

    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.stdout,
        )
    }

    pub fn step(&mut self) -> ControlFlow<Result<(), ExecutionError>> {
        self.inner.step(&mut self.stdout)
    }

    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        self.inner.execute_with_output(&mut self.stdout)
    }

    pub fn output(&self) -> String {
        self.stdout.get_string()
    }

    pub fn registers(&self) -> &Registers {
        self.inner.registers()
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    pub fn reset_registers(&mut self) {
        self.inner.reset_registers();
    }
}
