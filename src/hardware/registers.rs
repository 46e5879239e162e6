use crate::hardware::memory::PROGRAM_SECTION_START;
use std::fmt::{Debug, Formatter};

/// Number of the register receiving the return address of `JSR`, `JSRR` and `TRAP`.
pub const RETURN_ADDRESS_REGISTER: u8 = 7;

/// A single 16-bit register value with views as raw bits or 2's complement number.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Register(u16);

impl Register {
    #[must_use]
    pub const fn from_binary(value: u16) -> Self {
        Self(value)
    }
    #[must_use]
    pub const fn from_decimal(value: i16) -> Self {
        Self(value.cast_unsigned())
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    #[must_use]
    pub const fn as_decimal(self) -> i16 {
        self.0.cast_signed()
    }
}
impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.0, self.as_decimal())
    }
}

#[must_use]
pub const fn from_binary(value: u16) -> Register {
    Register::from_binary(value)
}
#[must_use]
pub const fn from_decimal(value: i16) -> Register {
    Register::from_decimal(value)
}

/// General purpose registers R0 to R7, the program counter and the condition register.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [Register; 8],
    pc: Register,
    cond: ConditionFlag,
}
impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "R0..R7: {:?}, PC: {:?}, COND: {:?}",
            self.general_purpose, self.pc, self.cond
        )
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); 8],
            pc: Register(PROGRAM_SECTION_START),
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not a valid register number `0..=7`
    #[must_use]
    pub fn get(&self, r: u8) -> Register {
        assert!(r <= 7, "Invalid general purpose register get: {r}");
        self.general_purpose[usize::from(r)]
    }
    /// Writes a general purpose register without touching the condition register.
    ///
    /// # Panics
    /// - `r` is not a valid register number `0..=7`
    pub fn set(&mut self, r: u8, value: Register) {
        assert!(r <= 7, "Invalid general purpose register set: {r}");
        self.general_purpose[usize::from(r)] = value;
    }
    #[must_use]
    pub const fn pc(&self) -> Register {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = Register(value);
    }
    /// Advances PC by one word, wrapping at the end of the address space.
    pub const fn increment_pc(&mut self) {
        self.pc = Register(self.pc.0.wrapping_add(1));
    }

    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    /// Sets the condition register from the sign of register `r`,
    /// to be called right after `r` was written by a flag setting operation.
    pub fn update_conditional_register(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r).as_binary());
    }
    /// Writes register `r` and updates the condition register from the written value.
    pub fn set_with_flags(&mut self, r: u8, value: Register) {
        self.set(r, value);
        self.update_conditional_register(r);
    }
}

/// Condition register content, the discriminants match the `n`, `z` and `p`
/// bits 11 to 9 of the BR instruction shifted down to bit 0.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}
impl ConditionFlag {
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
