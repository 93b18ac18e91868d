//! # LMC Virtual Machine.
//!
//! `lmc-vm` runs binary images for the Little Man Computer: one accumulator, at most 100
//! mailboxes and decimal encoded instructions.
//! An image is a flat array of native-endian `i16` words, usually produced by an assembler.
//!
//!  # Example
//! ```
//! use lmc_vm::emulator::Emulator;
//! use lmc_vm::terminal::Console;
//! // LDA 3, OUT, HLT, 42
//! let console = Console::new(&b""[..], Vec::new(), false);
//! let mut emu = Emulator::from_words(vec![503, 902, 0, 42], console);
//! emu.execute().unwrap();
//! assert_eq!(emu.registers().accumulator(), 42);
//! ```
//! # Errors
//! - The image cannot be opened, read or mapped, or ends with a partial word
//! - The program uses an illegal address or instruction
//! - `INP` runs out of input or reads something that is not a number

pub mod cli;
pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;

use emulator::Emulator;
use errors::RunError;
use hardware::ImageOptions;
use log::warn;
use std::io::{BufRead, Write};
use std::path::Path;
use terminal::Console;

/// Loads the image at `path`, runs it to completion and releases the image again.
///
/// The image is released on every exit path, also when the program faults.
///
/// # Errors
/// - Loading, executing or releasing the image failed, the first failure is reported
pub fn run_image<R: BufRead, W: Write>(
    path: &Path,
    options: ImageOptions,
    console: Console<R, W>,
) -> Result<(), RunError> {
    let mut emu = Emulator::from_image(path, options, console)?;
    let outcome = emu.execute();
    let released = emu.release();
    match (outcome, released) {
        (Err(e), Err(release_error)) => {
            warn!("releasing the image after a fault failed: {release_error}");
            Err(e.into())
        }
        (Err(e), Ok(())) => Err(e.into()),
        (Ok(()), released) => released,
    }
}
