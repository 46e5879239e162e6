use crate::numbers::{extract, place};
use std::fmt::{Debug, Formatter};

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_xxxx_xxxx_xxxx` with the opcode in the top nibble
/// and the remaining layout depending on the opcode.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the unsigned value of `len` bits whose most significant bit is `high`.
    #[must_use]
    pub const fn field(self, high: u8, len: u8) -> u16 {
        extract(self.0, high, len, false)
    }
    /// Gives the sign extended value of `len` bits whose most significant bit is `high`.
    #[must_use]
    pub const fn signed_field(self, high: u8, len: u8) -> u16 {
        extract(self.0, high, len, true)
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "fields of at most 3 bits always fit"
    )]
    const fn register_field(self, high: u8) -> u8 {
        self.field(high, 3) as u8
    }
    #[must_use]
    pub const fn get_bit(self, index: u8) -> bool {
        self.field(index, 1) == 1
    }
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "4 bits always fit")]
    pub const fn op_code(self) -> u8 {
        self.field(15, 4) as u8
    }
    /// DR, or SR for the store family
    #[must_use]
    pub const fn dr_number(self) -> u8 {
        self.register_field(11)
    }
    /// SR1, SR or `BaseR` depending on the opcode
    #[must_use]
    pub const fn sr1_number(self) -> u8 {
        self.register_field(8)
    }
    #[must_use]
    pub const fn sr2_number(self) -> u8 {
        self.register_field(2)
    }
    #[must_use]
    pub const fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    #[must_use]
    pub const fn get_immediate(self) -> u16 {
        self.signed_field(4, 5)
    }
    /// Sign extended offset of the lowest `len` bits, to be added with wrap around.
    #[must_use]
    pub const fn pc_offset(self, len: u8) -> u16 {
        self.signed_field(len - 1, len)
    }
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "8 bits always fit")]
    pub const fn trap_vector(self) -> u8 {
        self.field(7, 8) as u8
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X}: {:?}", self.0, Operation::decode(*self))
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

/// The 16 values of the opcode nibble.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, enumn::N)]
pub enum Opcode {
    Branch = 0b0000,
    Add = 0b0001,
    Load = 0b0010,
    Store = 0b0011,
    JumpRegister = 0b0100,
    And = 0b0101,
    LoadRegister = 0b0110,
    StoreRegister = 0b0111,
    ReturnFromInterrupt = 0b1000,
    Not = 0b1001,
    LoadIndirect = 0b1010,
    StoreIndirect = 0b1011,
    Jump = 0b1100,
    Reserved = 0b1101,
    LoadEffectiveAddress = 0b1110,
    Trap = 0b1111,
}
impl From<Instruction> for Opcode {
    fn from(i: Instruction) -> Self {
        Self::n(i.op_code()).unwrap_or_else(|| unreachable!("opcode has only 4 bits"))
    }
}

/// Second operand of ADD and AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Register(u8),
    /// Sign extended `imm5`
    Immediate(u16),
}

/// Jump target of JSR and JSRR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineTarget {
    /// JSR: sign extended `PCoffset11`
    PcOffset(u16),
    /// JSRR: `BaseR`
    BaseRegister(u8),
}

/// A decoded instruction, one variant per opcode with its operand fields.
/// Offsets and immediates are stored sign extended to 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Branch { nzp: u8, pc_offset: u16 },
    Add { dr: u8, sr1: u8, operand: Operand },
    Load { dr: u8, pc_offset: u16 },
    Store { sr: u8, pc_offset: u16 },
    JumpRegister { target: SubroutineTarget },
    And { dr: u8, sr1: u8, operand: Operand },
    LoadRegister { dr: u8, base_r: u8, offset: u16 },
    StoreRegister { sr: u8, base_r: u8, offset: u16 },
    ReturnFromInterrupt,
    Not { dr: u8, sr: u8 },
    LoadIndirect { dr: u8, pc_offset: u16 },
    StoreIndirect { sr: u8, pc_offset: u16 },
    Jump { base_r: u8 },
    Reserved,
    LoadEffectiveAddress { dr: u8, pc_offset: u16 },
    Trap { vector: u8 },
}

impl Operation {
    /// Decodes every possible instruction word, bits not used by the opcode's format are ignored.
    #[must_use]
    pub fn decode(i: Instruction) -> Self {
        let operand = || {
            if i.is_immediate() {
                Operand::Immediate(i.get_immediate())
            } else {
                Operand::Register(i.sr2_number())
            }
        };
        match Opcode::from(i) {
            Opcode::Branch => Self::Branch {
                nzp: i.dr_number(),
                pc_offset: i.pc_offset(9),
            },
            Opcode::Add => Self::Add {
                dr: i.dr_number(),
                sr1: i.sr1_number(),
                operand: operand(),
            },
            Opcode::Load => Self::Load {
                dr: i.dr_number(),
                pc_offset: i.pc_offset(9),
            },
            Opcode::Store => Self::Store {
                sr: i.dr_number(),
                pc_offset: i.pc_offset(9),
            },
            Opcode::JumpRegister => Self::JumpRegister {
                target: if i.get_bit(11) {
                    SubroutineTarget::PcOffset(i.pc_offset(11))
                } else {
                    SubroutineTarget::BaseRegister(i.sr1_number())
                },
            },
            Opcode::And => Self::And {
                dr: i.dr_number(),
                sr1: i.sr1_number(),
                operand: operand(),
            },
            Opcode::LoadRegister => Self::LoadRegister {
                dr: i.dr_number(),
                base_r: i.sr1_number(),
                offset: i.pc_offset(6),
            },
            Opcode::StoreRegister => Self::StoreRegister {
                sr: i.dr_number(),
                base_r: i.sr1_number(),
                offset: i.pc_offset(6),
            },
            Opcode::ReturnFromInterrupt => Self::ReturnFromInterrupt,
            Opcode::Not => Self::Not {
                dr: i.dr_number(),
                sr: i.sr1_number(),
            },
            Opcode::LoadIndirect => Self::LoadIndirect {
                dr: i.dr_number(),
                pc_offset: i.pc_offset(9),
            },
            Opcode::StoreIndirect => Self::StoreIndirect {
                sr: i.dr_number(),
                pc_offset: i.pc_offset(9),
            },
            Opcode::Jump => Self::Jump {
                base_r: i.sr1_number(),
            },
            Opcode::Reserved => Self::Reserved,
            Opcode::LoadEffectiveAddress => Self::LoadEffectiveAddress {
                dr: i.dr_number(),
                pc_offset: i.pc_offset(9),
            },
            Opcode::Trap => Self::Trap {
                vector: i.trap_vector(),
            },
        }
    }

    #[must_use]
    pub const fn opcode(self) -> Opcode {
        match self {
            Self::Branch { .. } => Opcode::Branch,
            Self::Add { .. } => Opcode::Add,
            Self::Load { .. } => Opcode::Load,
            Self::Store { .. } => Opcode::Store,
            Self::JumpRegister { .. } => Opcode::JumpRegister,
            Self::And { .. } => Opcode::And,
            Self::LoadRegister { .. } => Opcode::LoadRegister,
            Self::StoreRegister { .. } => Opcode::StoreRegister,
            Self::ReturnFromInterrupt => Opcode::ReturnFromInterrupt,
            Self::Not { .. } => Opcode::Not,
            Self::LoadIndirect { .. } => Opcode::LoadIndirect,
            Self::StoreIndirect { .. } => Opcode::StoreIndirect,
            Self::Jump { .. } => Opcode::Jump,
            Self::Reserved => Opcode::Reserved,
            Self::LoadEffectiveAddress { .. } => Opcode::LoadEffectiveAddress,
            Self::Trap { .. } => Opcode::Trap,
        }
    }

    /// Builds the canonical instruction word, bits not used by the format are 0,
    /// except the `11111` of NOT.
    #[must_use]
    pub fn encode(self) -> Instruction {
        let reg = |r: u8, high: u8| place(u16::from(r), high, 3);
        let operand = |operand: Operand| match operand {
            Operand::Register(sr2) => reg(sr2, 2),
            Operand::Immediate(imm5) => place(1, 5, 1) | place(imm5, 4, 5),
        };
        let fields = match self {
            Self::Branch { nzp, pc_offset } => reg(nzp, 11) | place(pc_offset, 8, 9),
            Self::Add { dr, sr1, operand: op } | Self::And { dr, sr1, operand: op } => {
                reg(dr, 11) | reg(sr1, 8) | operand(op)
            }
            Self::Load { dr: r, pc_offset }
            | Self::Store { sr: r, pc_offset }
            | Self::LoadIndirect { dr: r, pc_offset }
            | Self::StoreIndirect { sr: r, pc_offset }
            | Self::LoadEffectiveAddress { dr: r, pc_offset } => {
                reg(r, 11) | place(pc_offset, 8, 9)
            }
            Self::JumpRegister {
                target: SubroutineTarget::PcOffset(pc_offset),
            } => place(1, 11, 1) | place(pc_offset, 10, 11),
            Self::JumpRegister {
                target: SubroutineTarget::BaseRegister(base_r),
            }
            | Self::Jump { base_r } => reg(base_r, 8),
            Self::LoadRegister {
                dr: r,
                base_r,
                offset,
            }
            | Self::StoreRegister {
                sr: r,
                base_r,
                offset,
            } => reg(r, 11) | reg(base_r, 8) | place(offset, 5, 6),
            Self::Not { dr, sr } => reg(dr, 11) | reg(sr, 8) | 0b11_1111,
            Self::ReturnFromInterrupt | Self::Reserved => 0,
            Self::Trap { vector } => u16::from(vector),
        };
        Instruction::from(place(self.opcode() as u16, 15, 4) | fields)
    }
}
