use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, poll, read};
use std::io;
use std::time::Duration;

/// Providing Keyboard Input independent of an implementation.
///
/// At most one character is pending at a time: it becomes pending through
/// [`KeyboardInputProvider::check_input_available`] or
/// [`KeyboardInputProvider::read_input_character`] and is gone after being consumed.
pub trait KeyboardInputProvider {
    /// Checks if input is available, does not block.
    ///
    /// # Errors
    /// - the underlying input source cannot be polled
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Consumes the pending character if `check_input_available` returned `true`,
    /// `None` otherwise.
    fn get_input_character(&mut self) -> Option<u8>;
    /// Blocks until a character is available and consumes it.
    /// `None` means the input ended or was interrupted, no character will follow.
    ///
    /// # Errors
    /// - the underlying input source cannot be read
    fn read_input_character(&mut self) -> io::Result<Option<u8>>;
    /// True if CTRL-C was triggered
    fn is_interrupted(&self) -> bool;
}

/// Reads keys from the terminal, which needs to be in raw mode for single key presses.
pub struct TerminalInputProvider {
    available_char: Option<u8>,
    is_interrupted: bool,
}
impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}
impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available_char: None,
            is_interrupted: false,
        }
    }
    /// Handles one key press event, returns the character to hand to the program if any.
    fn handle_key_event(&mut self, event: &KeyEvent) -> Option<u8> {
        let c = match event.code {
            KeyCode::Enter => '\n',
            KeyCode::Tab => '\t',
            KeyCode::Backspace => '\u{8}',
            KeyCode::Esc => '\u{1b}',
            code => code.as_char()?,
        };
        if c == 'c' && event.modifiers == KeyModifiers::CONTROL {
            log::debug!("CTRL-C pressed, requesting stop");
            self.is_interrupted = true;
            return None;
        }
        u8::try_from(c).ok().filter(u8::is_ascii)
    }
    fn next_event(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        if let Some(timeout) = timeout
            && !poll(timeout)?
        {
            return Ok(None);
        }
        match read()?.as_key_press_event() {
            Some(event) => Ok(self.handle_key_event(&event)),
            None => Ok(None),
        }
    }
}
impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.available_char.is_none() {
            self.available_char = self.next_event(Some(Duration::from_secs(0)))?;
        }
        Ok(self.available_char.is_some())
    }
    fn get_input_character(&mut self) -> Option<u8> {
        self.available_char.take()
    }
    fn read_input_character(&mut self) -> io::Result<Option<u8>> {
        if let Some(c) = self.available_char.take() {
            return Ok(Some(c));
        }
        while !self.is_interrupted {
            if let Some(c) = self.next_event(None)? {
                return Ok(Some(c));
            }
        }
        Ok(None)
    }
    fn is_interrupted(&self) -> bool {
        self.is_interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use googletest::prelude::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    #[gtest]
    pub fn test_handle_key_event_characters() {
        let mut sut = TerminalInputProvider::new();
        expect_that!(
            sut.handle_key_event(&press(KeyCode::Char('a'), KeyModifiers::NONE)),
            some(eq(b'a'))
        );
        expect_that!(
            sut.handle_key_event(&press(KeyCode::Enter, KeyModifiers::NONE)),
            some(eq(b'\n'))
        );
        expect_that!(
            sut.handle_key_event(&press(KeyCode::Char('ä'), KeyModifiers::NONE)),
            none()
        );
        expect_that!(sut.is_interrupted(), eq(false));
    }
    #[gtest]
    pub fn test_handle_key_event_ctrl_c_interrupts() {
        let mut sut = TerminalInputProvider::new();
        expect_that!(
            sut.handle_key_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            none()
        );
        expect_that!(sut.is_interrupted(), eq(true));
    }
    #[gtest]
    pub fn test_get_input_character_without_input() {
        let mut sut = TerminalInputProvider::new();
        expect_that!(sut.get_input_character(), none());
    }
}
