use std::error::Error;
use std::io;

/// Failures while turning an image file into an address space.
#[derive(Debug, displaydoc::Display)]
pub enum LoadImageError {
    /// {operation}(): {source}
    Io {
        operation: &'static str,
        source: io::Error,
    },
    /// Image length of {byte_len} bytes is not a multiple of the 2 byte word size
    PartialWord { byte_len: u64 },
    /// Mapping image files into memory is not supported on this platform
    MappingUnsupported,
}
impl Error for LoadImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
impl LoadImageError {
    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

/// Faults that end a run before the program reaches `HLT`.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display)]
pub enum ExecutionError {
    /// Illegal address: {0}
    IllegalAddress(i32),
    /// Illegal Instruction: {0}
    IllegalInstruction(i16),
    /// EOF
    EndOfInput,
    /// Malformed number on input: {0:?}
    MalformedInput(String),
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
}
impl Error for ExecutionError {}

/// Any failure of a complete run: loading, executing or releasing the image.
#[derive(Debug, displaydoc::Display)]
pub enum RunError {
    /// {0}
    Load(LoadImageError),
    /// {0}
    Execution(ExecutionError),
    /// {operation}(): {source}
    Release {
        operation: &'static str,
        source: io::Error,
    },
}
impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Execution(e) => Some(e),
            Self::Release { source, .. } => Some(source),
        }
    }
}
impl From<LoadImageError> for RunError {
    fn from(e: LoadImageError) -> Self {
        Self::Load(e)
    }
}
impl From<ExecutionError> for RunError {
    fn from(e: ExecutionError) -> Self {
        Self::Execution(e)
    }
}
