//! # LC-3 Emulator.
//!
//! `lc3-vm` is an emulator of the LC-3 system, a 16-bit educational computer
//! with sixteen opcodes, eight general purpose registers and 65,536 words of
//! memory. Program images (big-endian origin word plus big-endian program
//! words) are installed into memory and run through the classic
//! fetch-decode-execute loop until the program issues the HALT trap.
//!
//! Usage starts with loading one or more images, either via
//! [`emulator::from_image_files`] or [`Emulator::load_image_file`].
//!
//! # Example
//! ```
//! use lc3_vm::emulator::Emulator;
//! use lc3_vm::emulator::image::Image;
//! use lc3_vm::hardware::Keyboard;
//! use std::sync::mpsc::channel;
//!
//! // ADD R0 <- R0 + 3, then HALT, loaded at the default origin 0x3000
//! let image = Image::from_bytes(&[0x30, 0x00, 0x10, 0x23, 0xF0, 0x25]).unwrap();
//! let (_sender, receiver) = channel();
//! let mut emu = Emulator::with_keyboard(Keyboard::from_receiver(receiver));
//! emu.load_image(&image);
//! let mut output = Vec::new();
//! emu.execute_with_output(&mut output).unwrap();
//! assert_eq!(emu.registers().get(0).as_binary(), 3);
//! ```
//! # Errors
//! - Image is missing its origin header or has an odd byte count
//! - Image file cannot be read
//! - A reserved opcode (RTI or 0b1101) is executed
//! - Host input or output fails during a trap

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod terminal;

mod numbers;

pub use emulator::Emulator;
