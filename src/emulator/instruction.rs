use crate::errors::ExecutionError;
use crate::hardware::{Address, Memory};
use crate::numbers::{Word, split_word};
use std::fmt::{Display, Formatter};

/// Opcode of the I/O group, the operand selects the actual operation.
const IO_GROUP: Word = 900;

/// Operations of the LMC, the discriminant is the opcode as found in a word.
#[repr(i16)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, enumn::N)]
pub enum Operation {
    Hlt = 0,
    Add = 100,
    Sub = 200,
    Sta = 300,
    Lda = 500,
    Bra = 600,
    Brz = 700,
    Brp = 800,
    Inp = 901,
    Out = 902,
}

impl Operation {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Hlt => "HLT",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Sta => "STA",
            Self::Lda => "LDA",
            Self::Bra => "BRA",
            Self::Brz => "BRZ",
            Self::Brp => "BRP",
            Self::Inp => "INP",
            Self::Out => "OUT",
        }
    }
}

/// One decoded word: `operand = word % 100`, `opcode = word - operand`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub operation: Operation,
    pub operand: Address,
}

impl Instruction {
    /// Decodes a fetched word.
    ///
    /// The operand is validated as an address first, for every operation, so `INP` (`901`)
    /// needs at least two mailboxes and `OUT` (`902`) three.
    ///
    /// # Errors
    /// - `IllegalAddress` if the operand is not a valid mailbox of `memory`
    /// - `IllegalInstruction` if the word does not encode a known operation
    pub fn decode(word: Word, memory: &Memory) -> Result<Self, ExecutionError> {
        let (opcode, operand) = split_word(word);
        let operand = memory.check_address(i32::from(operand))?;
        let code = if opcode == IO_GROUP { word } else { opcode };
        let operation = Operation::n(code).ok_or(ExecutionError::IllegalInstruction(word))?;
        Ok(Self { operation, operand })
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.operation {
            Operation::Hlt | Operation::Inp | Operation::Out => {
                write!(f, "{}", self.operation.mnemonic())
            }
            op => write!(f, "{} {:02}", op.mnemonic(), self.operand.value()),
        }
    }
}
