use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::KeyboardInputProvider;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Conventional start address of user programs and initial value of PC.
pub const PROGRAM_SECTION_START: u16 = 0x3000;
/// Number of addressable u16 cells, every u16 is a valid address.
pub const MEMORY_SIZE_U16: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, enumn::N)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// An abstraction for the LC-3 memory including application but excluding registers.
///
/// [`Memory::read`] and [`Memory::write`] are the accesses of running programs and honour the
/// memory mapped device registers, indexing gives plain access to the stored cells.
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
    keyboard: Box<dyn KeyboardInputProvider>,
    /// Set when a KBDR read hit the end of input or a failing keyboard,
    /// the machine stops after the current instruction.
    device_stop: Option<Result<(), ExecutionError>>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|cell| **cell != 0).count();
        write!(f, "Memory {{ non-zero cells: {used} }}")
    }
}
impl Index<u16> for Memory {
    type Output = u16;
    fn index(&self, index: u16) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}
impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, index: u16) -> &mut Self::Output {
        &mut self.data[usize::from(index)]
    }
}
impl Memory {
    const KEYBOARD_STATUS_REGISTER_SET: u16 = 1 << 15;
    const KEYBOARD_STATUS_REGISTER_UNSET: u16 = 0;

    #[must_use]
    pub fn new(keyboard: Box<dyn KeyboardInputProvider>) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE_U16].into_boxed_slice(),
            keyboard,
            device_stop: None,
        }
    }
    pub fn set_keyboard_input_provider(&mut self, keyboard: Box<dyn KeyboardInputProvider>) {
        self.keyboard = keyboard;
    }
    pub fn keyboard_mut(&mut self) -> &mut dyn KeyboardInputProvider {
        self.keyboard.as_mut()
    }
    #[must_use]
    pub fn keyboard(&self) -> &dyn KeyboardInputProvider {
        self.keyboard.as_ref()
    }

    /// Reads a cell as the running program sees it.
    ///
    /// - `KBSR` has bit 15 set iff a character is available from the keyboard
    /// - `KBDR` consumes and returns the available character, waiting for one if none is pending.
    ///   At the end of input or on a keyboard error it gives 0 and records a stop,
    ///   see [`Memory::take_device_stop`].
    pub fn read(&mut self, address: u16) -> u16 {
        match MemoryMappedIOLocations::n(address) {
            None => self[address],
            Some(MemoryMappedIOLocations::Kbsr) => match self.keyboard.check_input_available() {
                Ok(true) => Self::KEYBOARD_STATUS_REGISTER_SET,
                Ok(false) => Self::KEYBOARD_STATUS_REGISTER_UNSET,
                Err(e) => {
                    log::warn!("Polling keyboard failed, reporting no input: {e}");
                    Self::KEYBOARD_STATUS_REGISTER_UNSET
                }
            },
            Some(MemoryMappedIOLocations::Kbdr) => {
                if let Some(c) = self.keyboard.get_input_character() {
                    return u16::from(c);
                }
                match self.keyboard.read_input_character() {
                    Ok(Some(c)) => u16::from(c),
                    Ok(None) => {
                        log::debug!("Keyboard input ended while reading KBDR, stopping");
                        self.device_stop = Some(Ok(()));
                        0
                    }
                    Err(e) => {
                        self.device_stop =
                            Some(Err(ExecutionError::IOInputOutputError(e.to_string())));
                        0
                    }
                }
            }
        }
    }
    /// Hands out and clears the stop recorded by a KBDR read, if any.
    /// `Ok` means the input ended, `Err` that the keyboard failed.
    pub const fn take_device_stop(&mut self) -> Option<Result<(), ExecutionError>> {
        self.device_stop.take()
    }
    /// Writes a cell as the running program does, writes to device registers are dropped.
    pub fn write(&mut self, address: u16, value: u16) {
        if let Some(location) = MemoryMappedIOLocations::n(address) {
            log::trace!("Ignoring write of {value:#06X} to device register {location:?}");
        } else {
            self[address] = value;
        }
    }

    /// Copies `data` to consecutive addresses starting at `origin`.
    ///
    /// # Errors
    /// - Program does not fit between `origin` and the end of memory
    pub fn load_program(&mut self, origin: u16, data: &[u16]) -> Result<(), LoadProgramError> {
        let start = usize::from(origin);
        let maximum_instructions = MEMORY_SIZE_U16 - start;
        if data.len() > maximum_instructions {
            return Err(LoadProgramError::ProgramTooLong {
                origin,
                actual_instructions: data.len(),
                maximum_instructions,
            });
        }
        self.data[start..start + data.len()].copy_from_slice(data);
        log::debug!(
            "Loaded {} words at {origin:#06X}..{:#06X}",
            data.len(),
            start + data.len()
        );
        Ok(())
    }
}
