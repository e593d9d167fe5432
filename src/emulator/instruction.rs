use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Wrapper for one 16-bit LC-3 instruction word.
///
/// The top four bits select the opcode, the remaining twelve are operand
/// fields whose layout depends on the opcode. Each handler extracts its own
/// fields through the accessors below.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), must be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (0..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn op_code(self) -> OpCode {
        OpCode::from(self)
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// imm5 field, sign extended to a full word.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// offset6 field, sign extended to a full word.
    #[must_use]
    pub fn offset6(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 5), 6)
    }
    /// PCoffset9 field, sign extended to a full word.
    ///
    /// Added to the already incremented program counter with wrapping
    /// arithmetic, so a negative offset needs no separate signed type.
    #[must_use]
    pub fn pc_offset9(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 8), 9)
    }
    /// PCoffset11 field, sign extended to a full word.
    #[must_use]
    pub fn pc_offset11(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 10), 11)
    }
    /// Distinguishes JSR (PC-relative) from JSRR (register based).
    #[must_use]
    pub fn is_long_jump(self) -> bool {
        self.get_bit(11)
    }
    /// trapvect8 field, zero extended.
    #[must_use]
    pub fn trap_vector(self) -> u16 {
        self.get_bit_range(0, 7)
    }
    /// Branch condition bits in n, z, p order from most significant down.
    #[must_use]
    pub fn nzp(self) -> u16 {
        self.get_bit_range(9, 11)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Op: {:?}, bits: {:#018b}",
            self.op_code(),
            self.0
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

/// The sixteen LC-3 opcodes, in encoding order.
///
/// `Rti` and `Res` are reserved and fault on execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Br = 0x0,
    Add = 0x1,
    Ld = 0x2,
    St = 0x3,
    Jsr = 0x4,
    And = 0x5,
    Ldr = 0x6,
    Str = 0x7,
    Rti = 0x8,
    Not = 0x9,
    Ldi = 0xA,
    Sti = 0xB,
    Jmp = 0xC,
    Res = 0xD,
    Lea = 0xE,
    Trap = 0xF,
}

impl From<Instruction> for OpCode {
    fn from(instruction: Instruction) -> Self {
        match instruction.get_bit_range(12, 15) {
            0x0 => Self::Br,
            0x1 => Self::Add,
            0x2 => Self::Ld,
            0x3 => Self::St,
            0x4 => Self::Jsr,
            0x5 => Self::And,
            0x6 => Self::Ldr,
            0x7 => Self::Str,
            0x8 => Self::Rti,
            0x9 => Self::Not,
            0xA => Self::Ldi,
            0xB => Self::Sti,
            0xC => Self::Jmp,
            0xD => Self::Res,
            0xE => Self::Lea,
            0xF => Self::Trap,
            _ => unreachable!("a four bit value cannot exceed 0xF"),
        }
    }
}
