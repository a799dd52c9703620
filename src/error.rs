use thiserror::Error;

/// Fatal conditions raised by the CHIP-8 machine. Any of these ends the run;
/// there is no way to resume a machine once it has faulted.
///
/// `pc` is the address of the instruction that faulted, not the already
/// advanced program counter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineError {
    #[error("return with an empty call stack at 0x{pc:03x}")]
    StackUnderflow { pc: u16 },

    #[error("call stack overflow at 0x{pc:03x} (depth {depth})")]
    StackOverflow { pc: u16, depth: usize },

    #[error("key index 0x{key:02x} out of range at 0x{pc:03x}")]
    InvalidKeyIndex { pc: u16, key: u8 },

    #[error("memory access 0x{addr:04x}+{len} out of range at 0x{pc:03x}")]
    AddressOutOfRange { pc: u16, addr: u16, len: usize },
}

impl MachineError {
    /// re-tag an error raised below the engine with the faulting instruction
    pub(crate) fn at(self, pc: u16) -> Self {
        match self {
            MachineError::StackUnderflow { .. } => MachineError::StackUnderflow { pc },
            MachineError::StackOverflow { depth, .. } => MachineError::StackOverflow { pc, depth },
            MachineError::InvalidKeyIndex { key, .. } => MachineError::InvalidKeyIndex { pc, key },
            MachineError::AddressOutOfRange { addr, len, .. } => {
                MachineError::AddressOutOfRange { pc, addr, len }
            }
        }
    }
}
