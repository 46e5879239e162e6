//! The LC-3 machine and its fetch-execute loop.
use crate::emulator::instruction::{Instruction, Operation};
use crate::emulator::stdout_helpers::RawModeStdout;
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::{KeyboardInputProvider, TerminalInputProvider};
use crate::hardware::memory::{Memory, PROGRAM_SECTION_START};
use crate::hardware::registers::{RETURN_ADDRESS_REGISTER, Registers};
use crate::terminal;
use std::fs;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod instruction;
pub mod opcodes;
pub mod stdout_helpers;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

/// Reads a program image file, see [`from_program_bytes`].
///
/// # Errors
/// - File cannot be read
/// - See [`from_program_bytes`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| LoadProgramError::ProgramNotLoadable {
        file: path.display().to_string(),
        message: e.to_string(),
    })?;
    from_program_bytes(&bytes)
}

/// Decodes a program image of big endian u16 words, see [`from_program_words`].
///
/// # Errors
/// - Program has an odd number of bytes
/// - See [`from_program_words`]
pub fn from_program_bytes(program: &[u8]) -> Result<Emulator, LoadProgramError> {
    let (words, rest) = program.as_chunks::<2>();
    if !rest.is_empty() {
        return Err(LoadProgramError::ProgramNotEvenSize(program.len()));
    }
    let words: Vec<u16> = words.iter().map(|w| u16::from_be_bytes(*w)).collect();
    from_program_words(&words)
}

/// Creates an [`Emulator`] with the program loaded.
/// The first word is the `.ORIG` address the following words are copied to.
/// PC starts at `0x3000` independent of that origin.
///
/// # Errors
/// - Program is missing valid .ORIG header (because it is shorter than one `u16` instruction)
/// - Program does not fit into memory starting at its origin
pub fn from_program_words(program: &[u16]) -> Result<Emulator, LoadProgramError> {
    let Some((origin, rest)) = program.split_first() else {
        return Err(LoadProgramError::ProgramMissingOrigHeader);
    };
    let mut emu = Emulator::new();
    emu.memory.load_program(*origin, rest)?;
    emu.origin = *origin;
    Ok(emu)
}

/// The public facing emulator used to run LC-3 programs.
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    running: bool,
    origin: u16,
    stop_requested: Arc<AtomicBool>,
}
impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
impl Emulator {
    /// Zeroed memory and registers, PC at `0x3000`, reading the keyboard from the terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keyboard_input_provider(Box::new(TerminalInputProvider::new()))
    }
    #[must_use]
    pub fn with_keyboard_input_provider(keyboard: Box<dyn KeyboardInputProvider>) -> Self {
        Self {
            memory: Memory::new(keyboard),
            registers: Registers::new(),
            running: true,
            origin: PROGRAM_SECTION_START,
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
    #[cfg(test)]
    pub(crate) const fn parts_mut(&mut self) -> (&mut Registers, &mut Memory) {
        (&mut self.registers, &mut self.memory)
    }
    /// Address the loaded program image was placed at.
    #[must_use]
    pub const fn origin(&self) -> u16 {
        self.origin
    }
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }
    /// Flag checked before every instruction fetch, setting it stops the machine.
    /// Can be shared with other threads.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_requested)
    }
    /// Resets registers to their initial state and allows running the loaded program again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
        self.memory.take_device_stop();
        self.running = true;
        self.stop_requested.store(false, Ordering::Relaxed);
    }

    /// Runs the program on the terminal until it halts or is stopped.
    ///
    /// # Errors
    /// - Reading from stdin or writing to stdout fails
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        let _lock = terminal::set_terminal_raw();
        self.execute_with(&mut RawModeStdout::new())
    }

    /// Runs the program writing console output to `stdout` until it halts or is stopped.
    ///
    /// # Errors
    /// - Reading keyboard input or writing to `stdout` fails
    pub fn execute_with(&mut self, stdout: &mut impl Write) -> Result<(), ExecutionError> {
        while self.running {
            if self.stop_requested.load(Ordering::Relaxed) || self.memory.keyboard().is_interrupted()
            {
                log::debug!("Stop requested at PC {:?}", self.registers.pc());
                self.running = false;
                break;
            }
            if let ControlFlow::Break(result) = self.step(stdout) {
                return result;
            }
        }
        Ok(())
    }

    /// Fetches the instruction at PC, increments PC and executes the instruction.
    /// `Break` means the machine stopped running, with an error if the console failed.
    /// A machine that is no longer running is left untouched.
    pub fn step(&mut self, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
        if !self.running {
            return ControlFlow::Break(Ok(()));
        }
        let address = self.registers.pc().as_binary();
        let instruction = Instruction::from(self.memory.read(address));
        self.registers.increment_pc();
        log::trace!("{address:#06X}: {instruction:?}");
        let mut res = self.execute_instruction(instruction, stdout);
        if res.is_continue()
            && let Some(stop) = self.memory.take_device_stop()
        {
            log::debug!("Keyboard stopped the machine at {address:#06X}");
            res = ControlFlow::Break(stop);
        }
        if res.is_break() {
            self.running = false;
        }
        res
    }

    fn execute_instruction(
        &mut self,
        instruction: Instruction,
        stdout: &mut impl Write,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        let r = &mut self.registers;
        let mem = &mut self.memory;
        match Operation::decode(instruction) {
            Operation::Branch { nzp, pc_offset } => opcodes::br(nzp, pc_offset, r),
            Operation::Add { dr, sr1, operand } => opcodes::add(dr, sr1, operand, r),
            Operation::Load { dr, pc_offset } => opcodes::ld(dr, pc_offset, r, mem),
            Operation::Store { sr, pc_offset } => opcodes::st(sr, pc_offset, r, mem),
            Operation::JumpRegister { target } => opcodes::jsr(target, r),
            Operation::And { dr, sr1, operand } => opcodes::and(dr, sr1, operand, r),
            Operation::LoadRegister { dr, base_r, offset } => opcodes::ldr(dr, base_r, offset, r, mem),
            Operation::StoreRegister { sr, base_r, offset } => opcodes::str(sr, base_r, offset, r, mem),
            Operation::ReturnFromInterrupt => opcodes::rti(),
            Operation::Not { dr, sr } => opcodes::not(dr, sr, r),
            Operation::LoadIndirect { dr, pc_offset } => opcodes::ldi(dr, pc_offset, r, mem),
            Operation::StoreIndirect { sr, pc_offset } => opcodes::sti(sr, pc_offset, r, mem),
            Operation::Jump { base_r } => opcodes::jmp_or_ret(base_r, r),
            Operation::Reserved => opcodes::reserved(),
            Operation::LoadEffectiveAddress { dr, pc_offset } => opcodes::lea(dr, pc_offset, r),
            Operation::Trap { vector } => {
                r.set(RETURN_ADDRESS_REGISTER, r.pc());
                return trap_routines::dispatch(vector, r, mem, stdout);
            }
        }
        ControlFlow::Continue(())
    }
}
