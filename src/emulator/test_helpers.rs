use crate::emulator::Emulator;
use crate::numbers::Word;
use crate::terminal::Console;
use std::io;
use std::io::Write;

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

/// Rejects every write, like stdout after the reading end of a pipe went away.
pub struct FailingWriter;
impl Write for FailingWriter {
    fn write(&mut self, _data: &[u8]) -> Result<usize, io::Error> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

pub type FakeEmulator<'a> = Emulator<&'a [u8], StringWriter>;

/// An emulator over an in-memory image reading `stdin_data` through a non-interactive console.
pub fn fake_emulator<'a>(program: &[Word], stdin_data: &'a [u8]) -> FakeEmulator<'a> {
    fake_emulator_with_console(program, stdin_data, false)
}

pub fn fake_emulator_with_console<'a>(
    program: &[Word],
    stdin_data: &'a [u8],
    interactive: bool,
) -> FakeEmulator<'a> {
    Emulator::from_words(
        program.to_vec(),
        Console::new(stdin_data, StringWriter::new(), interactive),
    )
}

impl FakeEmulator<'_> {
    pub fn stdout_string(&self) -> String {
        self.console().output_ref().get_string()
    }
}
