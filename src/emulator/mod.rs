//! The fetch-decode-execute engine of the LMC.
pub mod instruction;
pub mod io_routines;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::errors::{ExecutionError, LoadImageError, RunError};
use crate::hardware::{AddressSpace, BufferedImage, ImageOptions, Memory, Registers, load_image};
use crate::numbers::Word;
use crate::terminal::Console;
use instruction::{Instruction, Operation};
use log::trace;
use std::io::{BufRead, StdinLock, Stdout, Write};
use std::ops::ControlFlow;
use std::path::Path;

/// Lifecycle of a run, `Halted` and `Faulted` are terminal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RunState {
    Running,
    Halted,
    Faulted(ExecutionError),
}

/// The public facing emulator used to run LMC programs.
pub struct Emulator<R = StdinLock<'static>, W = Stdout> {
    memory: Memory,
    registers: Registers,
    console: Console<R, W>,
    state: RunState,
}

impl<R: BufRead, W: Write> Emulator<R, W> {
    /// Starts a run over `space` with `pc = 0` and `accumulator = 0`.
    #[must_use]
    pub fn new(space: Box<dyn AddressSpace>, console: Console<R, W>) -> Self {
        Self {
            memory: Memory::new(space),
            registers: Registers::new(),
            console,
            state: RunState::Running,
        }
    }
    /// Runs a program held in memory only.
    #[must_use]
    pub fn from_words(words: Vec<Word>, console: Console<R, W>) -> Self {
        Self::new(Box::new(BufferedImage::from_words(words)), console)
    }
    /// Loads the image at `path` as described in [`load_image`].
    ///
    /// # Errors
    /// - See [`load_image`]
    pub fn from_image(
        path: &Path,
        options: ImageOptions,
        console: Console<R, W>,
    ) -> Result<Self, LoadImageError> {
        Ok(Self::new(load_image(path, options)?, console))
    }
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    #[must_use]
    pub const fn console(&self) -> &Console<R, W> {
        &self.console
    }
    #[must_use]
    pub const fn run_state(&self) -> &RunState {
        &self.state
    }

    /// Executes the program until `HLT` or the first fault.
    ///
    /// # Errors
    /// - Illegal address or instruction, input exhausted or malformed, output failed
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        loop {
            if let ControlFlow::Break(res) = self.step() {
                return res;
            }
        }
    }

    /// Executes one cycle.
    ///
    /// `Break(Ok(()))` once halted, `Break(Err(_))` once faulted. A machine that stopped
    /// keeps reporting how it stopped without executing anything.
    pub fn step(&mut self) -> ControlFlow<Result<(), ExecutionError>> {
        match &self.state {
            RunState::Halted => return ControlFlow::Break(Ok(())),
            RunState::Faulted(e) => return ControlFlow::Break(Err(e.clone())),
            RunState::Running => {}
        }
        let flow = self.cycle();
        if let ControlFlow::Break(res) = &flow {
            self.state = match res {
                Ok(()) => RunState::Halted,
                Err(e) => RunState::Faulted(e.clone()),
            };
        }
        flow
    }

    /// Hands the address space back, committing changes if write back was requested.
    ///
    /// # Errors
    /// - Writing the image failed
    pub fn release(self) -> Result<(), RunError> {
        self.memory.release()
    }

    fn cycle(&mut self) -> ControlFlow<Result<(), ExecutionError>> {
        let i = match self.fetch() {
            Ok(i) => i,
            Err(e) => return ControlFlow::Break(Err(e)),
        };
        let (regs, memory) = (&mut self.registers, &mut self.memory);
        match i.operation {
            Operation::Hlt => return io_routines::halt(),
            Operation::Add => opcodes::add(i, regs, memory),
            Operation::Sub => opcodes::sub(i, regs, memory),
            Operation::Sta => opcodes::sta(i, regs, memory),
            Operation::Lda => opcodes::lda(i, regs, memory),
            Operation::Bra => opcodes::bra(i, regs),
            Operation::Brz => opcodes::brz(i, regs),
            Operation::Brp => opcodes::brp(i, regs),
            Operation::Inp => return io_routines::inp(regs, &mut self.console),
            Operation::Out => return io_routines::out(regs, &mut self.console),
        }
        ControlFlow::Continue(())
    }

    fn fetch(&mut self) -> Result<Instruction, ExecutionError> {
        let address = self.memory.check_address(self.registers.pc())?;
        let word = self.memory[address];
        self.registers.increment_pc()?;
        let instruction = Instruction::decode(word, &self.memory)?;
        trace!(
            "{:02}: {word:>4} {instruction} acc={}",
            address.value(),
            self.registers.accumulator()
        );
        Ok(instruction)
    }
}
