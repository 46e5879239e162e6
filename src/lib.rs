//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` runs programs for the LC-3 (Little Computer 3) instruction set.
//! Usage starts with loading a program image via `emulator::from_program` followed by
//! `Emulator::execute`, which runs it on the terminal until the HALT trap.
//!
//!  # Example
//! ```
//! use lc3_vm::emulator;
//! // .ORIG x3000; ADD R0, R0, #7; HALT
//! let mut emu = emulator::from_program_words(&[0x3000, 0x1027, 0xF025]).unwrap();
//! let mut output = Vec::new();
//! emu.execute_with(&mut output).unwrap();
//! assert_eq!(emu.registers().get(0).as_decimal(), 7);
//! assert!(!emu.is_running());
//! ```
//! # Errors
//! - Program is missing valid .ORIG header (because it is shorter than one `u16` instruction)
//! - Program does not fit into memory starting at its origin
//! - Reading from stdin or writing to stdout fails while running

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub(crate) mod terminal;
