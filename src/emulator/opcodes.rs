//! Implemented operations for the LC 3.
//!
//! PC already points to the next instruction when these run, so every `PCoffset` is relative
//! to the incremented PC. All arithmetic wraps around at 16 bits.
use crate::emulator::instruction::{Operand, SubroutineTarget};
use crate::hardware::memory::Memory;
use crate::hardware::registers::{
    ConditionFlag, RETURN_ADDRESS_REGISTER, Registers, from_binary,
};

fn second_operand(operand: Operand, r: &Registers) -> u16 {
    match operand {
        Operand::Register(sr2) => r.get(sr2).as_binary(),
        Operand::Immediate(imm5) => imm5,
    }
}
fn address_by_pc_offset(pc_offset: u16, r: &Registers) -> u16 {
    r.pc().as_binary().wrapping_add(pc_offset)
}
fn address_by_baser_offset(base_r: u8, offset: u16, r: &Registers) -> u16 {
    r.get(base_r).as_binary().wrapping_add(offset)
}

/// ADD: Mathematical addition in 2 variants
/// - DR is set with result of SR 1 + SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0001 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 + sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0001 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn add(dr: u8, sr1: u8, operand: Operand, r: &mut Registers) {
    let sum = r
        .get(sr1)
        .as_binary()
        .wrapping_add(second_operand(operand, r));
    r.set_with_flags(dr, from_binary(sum));
}
/// AND: bit-wise AND in 2 variants
/// - DR is set with result of SR 1 AND SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0101 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 AND sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0101 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn and(dr: u8, sr1: u8, operand: Operand, r: &mut Registers) {
    let conjunction = r.get(sr1).as_binary() & second_operand(operand, r);
    r.set_with_flags(dr, from_binary(conjunction));
}
/// NOT: bit-wise complement of the value in SR
/// ```text
///  15__12__11_9__8_6___5___0_
/// | 1001 |  DR |  SR | 11111 |
///  --------------------------
/// ```
pub fn not(dr: u8, sr: u8, r: &mut Registers) {
    r.set_with_flags(dr, from_binary(!r.get(sr).as_binary()));
}
/// BR: Conditional Branch
/// This opcode adds the value of the sign extended offset to PC if the current state of the
/// [`ConditionFlag`] matches a set bit of `n`, `z` or `p`. With none of them set it never branches.
/// ```text
///  15__12__11_9___8_______0_
/// | 0000 |  nzp | PCoffset9 |
///  -------------------------
/// ```
pub fn br(nzp: u8, pc_offset: u16, r: &mut Registers) {
    let flag: ConditionFlag = r.get_conditional_register();
    if nzp & flag.bits() != 0 {
        r.set_pc(address_by_pc_offset(pc_offset, r));
    }
}
/// JSR: Jump to Sub-Routine.
/// Two variants:
/// - JSR to `PCOffset11`
/// ```text
///  15__12__11_10_________0
/// | 0100 | 1 | PCOffset11 |
///  -----------------------
/// ```
/// - JSRR: JSR to location in `BaseR`
/// ```text
///  15__12__11_9__8___6___5____0_
/// | 0100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
/// The former PC is saved in R7, the target is computed before that, so `JSRR R7` works.
pub fn jsr(target: SubroutineTarget, r: &mut Registers) {
    let temp_pc = r.pc();
    let new_pc = match target {
        SubroutineTarget::PcOffset(pc_offset) => address_by_pc_offset(pc_offset, r),
        SubroutineTarget::BaseRegister(base_r) => r.get(base_r).as_binary(),
    };
    r.set(RETURN_ADDRESS_REGISTER, temp_pc);
    r.set_pc(new_pc);
}
/// JMP or RET operation.
/// - JMP sets the PC to the value of register `BaseR`
/// ```text
///  15__12__11_9___8_6____5____0_
/// | 1100 | 000 | BaseR | 000000 |
///  -----------------------------
/// ```
/// - RET same as JMP, but special case for returning from JSR where former PC is saved in R7.
/// ```text
///  15__12__11_9__8_6___5____0_
/// | 1100 | 000 | 111 | 000000 |
///  ---------------------------
/// ```
pub fn jmp_or_ret(base_r: u8, r: &mut Registers) {
    r.set_pc(r.get(base_r).as_binary());
}

/// LD: Loads content of memory address of PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 0010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn ld(dr: u8, pc_offset: u16, r: &mut Registers, memory: &mut Memory) {
    let value = memory.read(address_by_pc_offset(pc_offset, r));
    r.set_with_flags(dr, from_binary(value));
}

/// LDI: Load indirect.
/// Calculates memory address of PC + sign extended offset and reads another address from there,
/// the content of the memory at that indirectly loaded address is put into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn ldi(dr: u8, pc_offset: u16, r: &mut Registers, memory: &mut Memory) {
    let value_address = memory.read(address_by_pc_offset(pc_offset, r));
    r.set_with_flags(dr, from_binary(memory.read(value_address)));
}
/// LDR: Load address from base register and adds sign extended offset to load the memory content
/// from there into DR.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0110 |  DR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn ldr(dr: u8, base_r: u8, offset: u16, r: &mut Registers, memory: &mut Memory) {
    let value = memory.read(address_by_baser_offset(base_r, offset, r));
    r.set_with_flags(dr, from_binary(value));
}

/// LEA: Load Effective Address loads PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1110 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn lea(dr: u8, pc_offset: u16, r: &mut Registers) {
    r.set_with_flags(dr, from_binary(address_by_pc_offset(pc_offset, r)));
}
/// ST: Store. The contents of the SR are written to memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 0011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn st(sr: u8, pc_offset: u16, r: &Registers, memory: &mut Memory) {
    memory.write(address_by_pc_offset(pc_offset, r), r.get(sr).as_binary());
}
/// STI: Store Indirect. The contents of the SR are written to the address which is loaded from
/// memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn sti(sr: u8, pc_offset: u16, r: &Registers, memory: &mut Memory) {
    let store_address = memory.read(address_by_pc_offset(pc_offset, r));
    memory.write(store_address, r.get(sr).as_binary());
}
/// STR: Store contents of SR to memory address of base register plus sign extended offset.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0111 |  SR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn str(sr: u8, base_r: u8, offset: u16, r: &Registers, memory: &mut Memory) {
    memory.write(
        address_by_baser_offset(base_r, offset, r),
        r.get(sr).as_binary(),
    );
}
/// RTI: Return from Interrupt.
/// Privilege modes and interrupts are not emulated, so this does nothing.
/// ```text
///  15__12__11_____________0_
/// | 1000 | 0000000000000000 |
///  -------------------------
/// ```
pub const fn rti() {}
/// Opcode `1101` is reserved and does nothing.
pub const fn reserved() {}
