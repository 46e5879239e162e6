use std::io::{Stdout, Write, stdout};

/// Stdout for a terminal in raw mode: there a line feed does not return the cursor to
/// the first column, so every `\n` is written as `\r\n`.
pub struct RawModeStdout<W: Write = Stdout> {
    inner: W,
}
impl Default for RawModeStdout {
    fn default() -> Self {
        Self::new()
    }
}
impl RawModeStdout {
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(stdout())
    }
}
impl<W: Write> RawModeStdout<W> {
    pub const fn wrap(inner: W) -> Self {
        Self { inner }
    }
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for RawModeStdout<W> {
    /// Consumes input up to and including the first `\n` at most, so the reported
    /// count always refers to bytes of `buf`.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match buf.iter().position(|b| *b == b'\n') {
            None => self.inner.write(buf),
            Some(0) => {
                self.inner.write_all(b"\r\n")?;
                Ok(1)
            }
            Some(idx) => self.inner.write(&buf[..idx]),
        }
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
