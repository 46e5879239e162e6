//! Machine parts of the LC-3: memory with its mapped keyboard device and the register file.
pub mod keyboard;
pub mod memory;
pub mod registers;

pub use memory::Memory;
pub use registers::Registers;
