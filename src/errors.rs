//! Errors that can occur using this crate.
//!
//! The crate's code is designed in a way that functions/methods _can_ trigger all the enum variants
//! specified in the returned [`Result`]

use displaydoc::Display;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Possible errors during image load.
///
/// Issues are invalid image files or errors during attempts to read them.
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[expect(clippy::doc_markdown, reason = "using backticks as suggested would break displaydoc")]
#[derive(Display, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Image is missing its origin header (shorter than one 16-bit word)
    ImageMissingOrigHeader,
    /// Images must be an even amount of bytes (origin plus 16-bit words), but is {0} bytes long
    ImageNotEvenSize(u64),
    /// Cannot read image from file '{file}': {message}
    ImageNotLoadable {
        file: String,
        message: String
    },
}
impl Debug for LoadProgramError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for LoadProgramError {}

/// Possible errors during program execution.
///
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[derive(Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// The reserved opcode {0:#06b} was found which is not specified. Most probably an invalid program.
    ReservedInstructionFound(u8),
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Keyboard input channel is closed, no further input can be read
    KeyboardDisconnected,
}
impl Debug for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for ExecutionError {}
