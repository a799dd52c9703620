use crate::display::Framebuffer;
use crate::error::MachineError;
use crate::memory::{Chip8MemoryMap, LoadReport, CHIP8_PROGRAM_ADDR};
use crate::timer::Timer;
use std::io;

/// how deep subroutine calls can nest
pub const CHIP8_STACK_DEPTH: usize = 16;

/// register used as the carry/borrow/collision flag
pub const VF: usize = 0xf;

/// Fixed-depth return address stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    slots: [u16; CHIP8_STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            slots: [0; CHIP8_STACK_DEPTH],
            sp: 0,
        }
    }

    /// number of return addresses held
    pub fn depth(&self) -> usize {
        self.sp
    }

    pub fn push(&mut self, addr: u16) -> Result<(), MachineError> {
        let slot = self
            .slots
            .get_mut(self.sp)
            .ok_or(MachineError::StackOverflow {
                pc: 0,
                depth: CHIP8_STACK_DEPTH,
            })?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, MachineError> {
        if self.sp == 0 {
            return Err(MachineError::StackUnderflow { pc: 0 });
        }
        self.sp -= 1;
        Ok(self.slots[self.sp])
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the CHIP-8 program can see or change. Created once with the
/// font in place, then mutated by the cpu for the life of the run.
pub struct Machine {
    pub memory: Chip8MemoryMap,
    pub registers: [u8; 16],
    pub i: u16,
    pub stack: CallStack,
    pub pc: u16,
    pub display: Framebuffer,
    pub delay_timer: Timer,
    pub sound_timer: Timer,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            memory: Chip8MemoryMap::new(),
            registers: [0; 16],
            i: 0,
            stack: CallStack::new(),
            pc: CHIP8_PROGRAM_ADDR,
            display: Framebuffer::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
        }
    }

    /// machine with `program` loaded at 0x200; handy for tests
    pub fn with_program(program: &[u8]) -> Result<Self, io::Error> {
        let mut m = Machine::new();
        m.load_program(&mut &program[..])?;
        Ok(m)
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<LoadReport, io::Error> {
        self.memory.load_program(reader)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
