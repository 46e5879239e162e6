use crate::errors::ExecutionError;
use crate::hardware::memory::{MEMORY_SIZE_U16, Memory};
use crate::hardware::registers::{Registers, from_binary};
use std::io;
use std::io::Write;
use std::ops::ControlFlow;

/// Built-in service routines selectable by the 8-bit vector of a TRAP instruction.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, enumn::N)]
pub enum TrapVector {
    GetC = 0x20,
    Out = 0x21,
    PutS = 0x22,
    In = 0x23,
    Halt = 0x25,
}

/// Runs the routine for `vector`, vectors without a routine do nothing.
///
/// `Continue` keeps the machine running, `Break(Ok)` halts it, `Break(Err)` reports
/// a failing console.
pub fn dispatch(
    vector: u8,
    regs: &mut Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match TrapVector::n(vector) {
        Some(TrapVector::GetC) => get_c(regs, mem),
        Some(TrapVector::Out) => out(regs, stdout),
        Some(TrapVector::PutS) => put_s(regs, mem, stdout),
        Some(TrapVector::In) => in_trap(regs, mem, stdout),
        Some(TrapVector::Halt) => halt(stdout),
        None => {
            log::trace!("No routine for trap vector {vector:#04X}, ignoring");
            ControlFlow::Continue(())
        }
    }
}

/// Blocks for one character and puts it into R0, ends the program at the end of input.
fn read_character_from_keyboard(
    regs: &mut Registers,
    mem: &mut Memory,
) -> ControlFlow<Result<(), ExecutionError>, u8> {
    match mem.keyboard_mut().read_input_character() {
        Ok(Some(c)) => {
            regs.set(0, from_binary(u16::from(c)));
            ControlFlow::Continue(c)
        }
        Ok(None) => {
            log::debug!("Keyboard input ended, stopping");
            ControlFlow::Break(Ok(()))
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(regs: &mut Registers, mem: &mut Memory) -> ControlFlow<Result<(), ExecutionError>> {
    read_character_from_keyboard(regs, mem)?;
    ControlFlow::Continue(())
}

/// IN: Print a prompt on the screen and read a single character echoed back from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    mem: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(b"Input: ", stdout)?;
    let c = read_character_from_keyboard(regs, mem)?;
    write_out(&[c], stdout)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(&regs.get(0).as_binary().to_le_bytes()[..1], stdout)
}

/// PUTS: Write the characters of consecutive memory cells starting at the address in R0,
/// one character per cell from bits [7:0], up to the first 0x0000 cell.
pub fn put_s(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut s = Vec::with_capacity(120);
    // a string without terminator ends after one pass over memory
    for _ in 0..MEMORY_SIZE_U16 {
        if mem[address] == 0 {
            break;
        }
        s.push(mem[address].to_le_bytes()[0]);
        address = address.wrapping_add(1);
    }
    write_out(&s, stdout)
}

/// HALT: End program and stdout a message
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(b"\nProgram halted\n", stdout)?;
    log::debug!("Program halted");
    ControlFlow::Break(Ok(()))
}

fn write_out(message: &[u8], stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    match stdout.write_all(message).and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf<T>(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, T> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
