use std::io;
use thiserror::Error;

/// Conditions that stop the machine. Raised by memory, stack and decoder,
/// which don't know where the program counter is; the interpreter attaches
/// that when it surfaces them as [`Error::Fatal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("unknown instruction {word:#06x}")]
    UnknownInstruction { word: u16 },

    #[error("stack overflow")]
    StackOverflow,

    #[error("stack underflow")]
    StackUnderflow,

    #[error("memory access at {addr:#06x} is outside of RAM")]
    AddressOutOfRange { addr: usize },

    #[error("write to reserved interpreter memory at {addr:#05x}")]
    ReservedWrite { addr: usize },

    #[error("program counter left program memory")]
    BadProgramCounter,

    #[error("no such key {key:#04x}")]
    InvalidKey { key: u8 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("program is {size} bytes, at most {max} fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("instruction rate {rate}Hz is outside {min}..={max}Hz")]
    InvalidRate { rate: u32, min: u32, max: u32 },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{fault} at pc {pc:#05x}")]
    Fatal { pc: u16, fault: Fault },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_message_names_word_and_pc() {
        let e = Error::Fatal {
            pc: 0x2a4,
            fault: Fault::UnknownInstruction { word: 0x5121 },
        };
        assert_eq!(e.to_string(), "unknown instruction 0x5121 at pc 0x2a4");
    }

    #[test]
    fn test_too_large_message() {
        let e = Error::ProgramTooLarge {
            size: 3585,
            max: 3584,
        };
        assert_eq!(
            e.to_string(),
            "program is 3585 bytes, at most 3584 fit in memory"
        );
    }
}
