use std::error::Error;

/// Errors raised while placing a program image into memory.
#[derive(Debug, displaydoc::Display, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Program is missing valid .ORIG header
    ProgramMissingOrigHeader,
    /// Program has an odd size of {0} bytes, the last u16 word is truncated
    ProgramNotEvenSize(usize),
    /// Program too long, got {actual_instructions} u16 words at origin {origin:#06X} while limit is {maximum_instructions}
    ProgramTooLong {
        origin: u16,
        actual_instructions: usize,
        maximum_instructions: usize,
    },
    /// Program file {file} could not be loaded: {message}
    ProgramNotLoadable { file: String, message: String },
}
impl Error for LoadProgramError {}

/// Errors ending a running program other than the HALT trap.
#[derive(Debug, displaydoc::Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
}
impl Error for ExecutionError {}
