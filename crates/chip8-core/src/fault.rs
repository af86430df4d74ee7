use thiserror::Error;

/// Fault classes used by drivers to pick a recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder rejected an instruction word.
    Decode,
    /// Call stack bound violation.
    Stack,
    /// Memory bound or write-policy violation.
    Memory,
}

/// Structured, non-fatal error raised by a single execution step.
///
/// A step that returns a fault has not mutated the machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// `RET` executed with an empty call stack.
    #[error("return with empty call stack")]
    StackUnderflow,
    /// `CALL` executed with all stack slots in use.
    #[error("call stack overflow")]
    StackOverflow,
    /// Instruction word does not match any known encoding.
    #[error("unimplemented opcode {0:#06X}")]
    UnimplementedOpcode(u16),
    /// Fetch or data access resolved past the end of memory.
    #[error("memory access out of bounds at {addr:#06X}")]
    MemoryOutOfBounds {
        /// First offending address.
        addr: u16,
    },
    /// Data write targeted the interpreter area below the program start.
    #[error("write to reserved interpreter memory at {addr:#06X}")]
    ReservedMemoryWrite {
        /// First offending address.
        addr: u16,
    },
}

impl Fault {
    /// Returns the fault class for this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnimplementedOpcode(_) => FaultClass::Decode,
            Self::StackUnderflow | Self::StackOverflow => FaultClass::Stack,
            Self::MemoryOutOfBounds { .. } | Self::ReservedMemoryWrite { .. } => {
                FaultClass::Memory
            }
        }
    }

    /// Raw instruction word carried by an unimplemented-opcode fault.
    #[must_use]
    pub const fn opcode(self) -> Option<u16> {
        match self {
            Self::UnimplementedOpcode(word) => Some(word),
            Self::StackUnderflow
            | Self::StackOverflow
            | Self::MemoryOutOfBounds { .. }
            | Self::ReservedMemoryWrite { .. } => None,
        }
    }
}

/// Error returned when a program image cannot be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LoadError {
    /// Program does not fit between the program start and the end of memory.
    #[error("program of {len} bytes exceeds the {capacity} bytes available")]
    ProgramTooLarge {
        /// Length of the rejected image.
        len: usize,
        /// Bytes available from the program start.
        capacity: usize,
    },
}
