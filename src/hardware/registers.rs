use crate::errors::ExecutionError;
use crate::hardware::memory::Address;
use crate::numbers::Word;

/// Execution state of the LMC: program counter and accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pc: i32,
    accumulator: Word,
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pc: 0,
            accumulator: 0,
        }
    }
    /// Not validated, the next fetch checks it against the address space.
    #[must_use]
    pub const fn pc(&self) -> i32 {
        self.pc
    }
    pub fn set_pc(&mut self, address: Address) {
        self.pc = address.value();
    }
    /// Advances past the fetched instruction.
    ///
    /// # Errors
    /// - The program counter cannot be represented any more
    pub fn increment_pc(&mut self) -> Result<(), ExecutionError> {
        self.pc = self
            .pc
            .checked_add(1)
            .ok_or(ExecutionError::IllegalAddress(self.pc))?;
        Ok(())
    }
    #[must_use]
    pub const fn accumulator(&self) -> Word {
        self.accumulator
    }
    pub const fn set_accumulator(&mut self, value: Word) {
        self.accumulator = value;
    }
}
