use crate::emulator;
use crate::emulator::Emulator;
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::collections::VecDeque;
use std::io;
use std::io::Write;

/// Scripted keyboard: hands out the given characters in order, every character is
/// immediately available. Reading past the end behaves like the end of input.
pub struct FakeKeyboardInputProvider {
    remaining: VecDeque<u8>,
    pending: Option<u8>,
}
impl FakeKeyboardInputProvider {
    pub fn new(input: &str) -> Self {
        Self::from_bytes(input.as_bytes())
    }
    pub fn from_bytes(input: &[u8]) -> Self {
        Self {
            remaining: input.iter().copied().collect(),
            pending: None,
        }
    }
}
impl KeyboardInputProvider for FakeKeyboardInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.pending.is_none() {
            self.pending = self.remaining.pop_front();
        }
        Ok(self.pending.is_some())
    }
    fn get_input_character(&mut self) -> Option<u8> {
        self.pending.take()
    }
    fn read_input_character(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pending.take().or_else(|| self.remaining.pop_front()))
    }
    fn is_interrupted(&self) -> bool {
        false
    }
}

/// Keyboard whose every access fails.
pub struct BrokenKeyboardInputProvider;
impl KeyboardInputProvider for BrokenKeyboardInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        Err(io::Error::other("Error during poll"))
    }
    fn get_input_character(&mut self) -> Option<u8> {
        None
    }
    fn read_input_character(&mut self) -> io::Result<Option<u8>> {
        Err(io::Error::other("Error during read"))
    }
    fn is_interrupted(&self) -> bool {
        false
    }
}

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Writer whose every write fails.
pub struct BrokenWriter;
impl Write for BrokenWriter {
    fn write(&mut self, _data: &[u8]) -> Result<usize, io::Error> {
        Err(io::Error::other("Error during write"))
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

/// Emulator with a program loaded at `0x3000`, scripted keyboard input and captured output.
pub struct FakeEmulator {
    inner: Emulator,
    stdout: StringWriter,
}
impl FakeEmulator {
    pub fn new(program_no_header: &[u16]) -> Self {
        let mut program = Vec::with_capacity(program_no_header.len() + 1);
        program.push(0x3000u16);
        program.extend_from_slice(program_no_header);

        let mut inner = emulator::from_program_words(program.as_slice()).unwrap();
        inner
            .memory_mut()
            .set_keyboard_input_provider(Box::new(FakeKeyboardInputProvider::new("")));
        Self {
            inner,
            stdout: StringWriter::new(),
        }
    }
    pub fn add_stdin_input(&mut self, input: &str) -> &mut Self {
        self.inner
            .memory_mut()
            .set_keyboard_input_provider(Box::new(FakeKeyboardInputProvider::new(input)));
        self
    }
    pub fn emulator(&mut self) -> &mut Emulator {
        &mut self.inner
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        let (regs, mem) = self.inner.parts_mut();
        (regs, mem, &mut self.stdout)
    }
    pub fn execute(&mut self) -> Result<(), crate::errors::ExecutionError> {
        self.inner.execute_with(&mut self.stdout)
    }
    pub fn output(&self) -> String {
        self.stdout.get_string()
    }
}
