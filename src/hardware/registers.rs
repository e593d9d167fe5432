use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Address the program counter starts at.
pub const PC_START: u16 = 0x3000;

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Register(u16);
impl Register {
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    pub fn as_decimal(self) -> i16 {
        numbers::twos_complement_to_decimal(self.0)
    }
}

pub const fn from_binary(value: u16) -> Register {
    Register(value)
}
pub fn from_decimal(value: i16) -> Register {
    Register(numbers::decimal_to_twos_complement(value))
}

impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:#06X} {:#018b} {})",
            self.0,
            self.0,
            self.as_decimal()
        )
    }
}
impl PartialEq<u16> for Register {
    fn eq(&self, other: &u16) -> bool {
        self.0.eq(other)
    }
}
impl From<u16> for Register {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
impl From<Register> for u16 {
    fn from(value: Register) -> Self {
        value.0
    }
}

/// The LC-3 register file: eight general purpose registers, the program
/// counter and the condition register.
///
/// All program counter arithmetic wraps modulo 2^16.
pub struct Registers {
    general_purpose: [Register; 8],
    pc: Register,
    cond: ConditionFlag,
}
impl Registers {
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); 8],
            pc: Register(PC_START),
            cond: ConditionFlag::Zero,
        }
    }
    pub const fn pc(&self) -> Register {
        self.pc
    }
    pub fn inc_pc(&mut self) {
        self.set_pc(self.pc.0.wrapping_add(1));
    }
    pub fn set_pc(&mut self, val: u16) {
        self.pc = val.into();
    }
    pub fn get(&self, r: u8) -> Register {
        debug_assert!(r <= 7, "Invalid general purpose register get");
        self.general_purpose[usize::from(r)]
    }
    pub fn set(&mut self, r: u8, value: Register) {
        debug_assert!(r <= 7, "Invalid general purpose register set");
        self.general_purpose[usize::from(r)] = value;
    }
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    pub fn update_conditional_register(&mut self, r: u8) {
        let val = self.get(r);
        self.cond = ConditionFlag::from(val);
    }
}
impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, val) in self.general_purpose.iter().enumerate() {
            writeln!(f, "R{index}:   {val:?}")?;
        }
        writeln!(f)?;
        writeln!(f, "PC:   {:?}", self.pc)?;
        writeln!(f, "Cond: {:?}", self.cond)?;
        Ok(())
    }
}

/// Condition codes, set from the value most recently written to a general
/// purpose register. Exactly one flag is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}
impl From<Register> for ConditionFlag {
    fn from(value: Register) -> Self {
        if value.0 == 0 {
            Self::Zero
        } else if value.0 >> 15 == 1 {
            // leftmost bit is 1 for negative numbers in two's complement
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
