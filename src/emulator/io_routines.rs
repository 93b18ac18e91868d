use crate::errors::ExecutionError;
use crate::hardware::registers::Registers;
use crate::numbers::Word;
use crate::terminal::Console;
use std::io;
use std::io::{BufRead, Write};
use std::ops::ControlFlow;

/// Written before `INP` blocks, only if the console is interactive.
pub const PROMPT: &str = "Please enter a number: ";

/// INP: Read one decimal number from the input into the accumulator.
///
/// The prompt is only shown on an interactive console so piped output stays clean.
/// End of input and malformed numbers end the run.
pub fn inp<R: BufRead, W: Write>(
    regs: &mut Registers,
    console: &mut Console<R, W>,
) -> ControlFlow<Result<(), ExecutionError>> {
    if console.is_interactive() {
        write_str_out(PROMPT, console.output())?;
    }
    match read_number(console.input()) {
        Ok(value) => {
            regs.set_accumulator(value);
            ControlFlow::Continue(())
        }
        Err(e) => ControlFlow::Break(Err(e)),
    }
}

/// OUT: Write the accumulator followed by a newline.
pub fn out<R, W: Write>(
    regs: &Registers,
    console: &mut Console<R, W>,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out(&format!("{}\n", regs.accumulator()), console.output())
}

/// HLT: End the program.
pub const fn halt() -> ControlFlow<Result<(), ExecutionError>> {
    ControlFlow::Break(Ok(()))
}

fn read_number(input: &mut impl BufRead) -> Result<Word, ExecutionError> {
    let token = read_token(input)
        .map_err(|e| ExecutionError::IOInputOutputError(e.to_string()))?
        .ok_or(ExecutionError::EndOfInput)?;
    token
        .parse::<Word>()
        .map_err(|_| ExecutionError::MalformedInput(token))
}

/// Skips leading whitespace and returns the next whitespace delimited token,
/// `None` if the input ends before one starts.
///
/// Consumes the token and the single whitespace byte ending it, nothing more.
fn read_token(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut token = Vec::new();
    loop {
        let (used, complete) = {
            let buf = match input.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                break;
            }
            let mut used = 0;
            let mut complete = false;
            for &b in buf {
                used += 1;
                if b.is_ascii_whitespace() {
                    if !token.is_empty() {
                        complete = true;
                        break;
                    }
                } else {
                    token.push(b);
                }
            }
            (used, complete)
        };
        input.consume(used);
        if complete {
            break;
        }
    }
    if token.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&token).into_owned()))
}

fn write_str_out(message: &str, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    match stdout
        .write_all(message.as_bytes())
        .and_then(|()| stdout.flush())
    {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, ()> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::{FailingWriter, StringWriter};
    use googletest::prelude::*;
    use yare::parameterized;

    fn console(input: &[u8], interactive: bool) -> Console<&[u8], StringWriter> {
        Console::new(input, StringWriter::new(), interactive)
    }

    #[gtest]
    pub fn test_inp_piped_has_no_prompt() {
        let mut console = console(b"7\n", false);
        let mut regs = Registers::new();
        let res = inp(&mut regs, &mut console);
        assert_that!(res, eq(&ControlFlow::Continue(())));
        expect_that!(regs.accumulator(), eq(7));
        expect_that!(console.output_ref().get_string(), eq(""));
    }
    #[gtest]
    pub fn test_inp_interactive_prompts() {
        let mut console = console(b"  -12 5", true);
        let mut regs = Registers::new();
        let res = inp(&mut regs, &mut console);
        assert_that!(res, eq(&ControlFlow::Continue(())));
        expect_that!(regs.accumulator(), eq(-12));
        expect_that!(
            console.output_ref().get_string(),
            eq("Please enter a number: ")
        );
    }
    #[gtest]
    pub fn test_inp_reads_one_token_per_call() {
        let mut console = console(b"1\n\n  22\t333", false);
        let mut regs = Registers::new();
        let mut seen = vec![];
        for _ in 0..3 {
            assert!(inp(&mut regs, &mut console).is_continue());
            seen.push(regs.accumulator());
        }
        expect_that!(seen, eq(&vec![1, 22, 333]));
        expect_that!(
            inp(&mut regs, &mut console),
            eq(&ControlFlow::Break(Err(ExecutionError::EndOfInput)))
        );
    }

    #[parameterized(
        empty = { b"" },
        whitespace_only = { b" \n\t\n" },
    )]
    fn test_inp_end_of_input(input: &[u8]) {
        let mut console = console(input, false);
        let mut regs = Registers::new();
        assert_that!(
            inp(&mut regs, &mut console),
            eq(&ControlFlow::Break(Err(ExecutionError::EndOfInput)))
        );
    }

    #[parameterized(
        letters = { b"abc\n", "abc" },
        trailing_garbage = { b"7x", "7x" },
        out_of_range = { b"40000", "40000" },
    )]
    fn test_inp_malformed(input: &[u8], token: &str) {
        let mut console = console(input, false);
        let mut regs = Registers::new();
        assert_that!(
            inp(&mut regs, &mut console),
            eq(&ControlFlow::Break(Err(ExecutionError::MalformedInput(
                token.to_string()
            ))))
        );
        assert_that!(regs.accumulator(), eq(0));
    }

    #[gtest]
    pub fn test_out() {
        let mut console = console(b"", false);
        let mut regs = Registers::new();
        regs.set_accumulator(-42);
        assert!(out(&regs, &mut console).is_continue());
        regs.set_accumulator(5);
        assert!(out(&regs, &mut console).is_continue());
        expect_that!(console.output_ref().get_string(), eq("-42\n5\n"));
    }
    #[gtest]
    pub fn test_out_write_error() {
        let mut console = Console::new(&b""[..], FailingWriter, false);
        let regs = Registers::new();
        let res = out(&regs, &mut console);
        let execution_error = res.break_value().unwrap().unwrap_err();
        assert_that!(
            execution_error.to_string(),
            eq("Error during reading Stdin or writing program output to Stdout: broken pipe")
        );
    }
}
