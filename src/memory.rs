use crate::error::MachineError;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents a flat, byte-addressable memory.
///
/// Every access is range-checked; reaching past the end of memory is an
/// `AddressOutOfRange` rather than a panic. The `pc` in the returned error is
/// left as zero for the engine to fill in.
pub trait MemoryMap {
    /// size of the memory in bytes
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], MachineError>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], MachineError>;

    /// write a chunk of bytes into memory
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), MachineError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16, MachineError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(((word[0] as u16) << 8) | (word[1] as u16))
    }

    /// write as much of `data` as fits from `addr` to the end of memory,
    /// returning how many bytes were written
    fn write_truncated(&mut self, data: &[u8], addr: u16) -> Result<usize, MachineError> {
        let room = self.size().saturating_sub(addr as usize);
        let len = data.len().min(room);
        self.write(&data[..len], addr)?;
        Ok(len)
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program image that fits
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// bytes per hex digit glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Outcome of loading a program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// bytes actually placed in memory
    pub loaded: usize,
    /// bytes dropped because they would not fit
    pub truncated: usize,
}

/// The 4K CHIP-8 memory map:
///   0x0000-0x004f  hex digit font
///   0x0050-0x01ff  reserved for the interpreter
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8; CHIP8_RAM_SIZE_BYTES]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        CHIP8_RAM_SIZE_BYTES
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], MachineError> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(MachineError::AddressOutOfRange { pc: 0, addr, len })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], MachineError> {
        let a = addr as usize;
        self.bytes
            .get(a..a + len)
            .ok_or(MachineError::AddressOutOfRange { pc: 0, addr, len })
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut bytes = Box::new([0u8; CHIP8_RAM_SIZE_BYTES]);
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes }
    }

    /// load a CHIP-8 program at 0x200; anything past the end of memory is
    /// dropped
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<LoadReport, io::Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        // the program area always fits, so this can't go out of range
        let loaded = self
            .write_truncated(&buf, CHIP8_PROGRAM_ADDR)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(LoadReport {
            loaded,
            truncated: buf.len() - loaded,
        })
    }

    /// address of the glyph for hex digit `digit`
    pub fn font_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + digit as u16 * CHIP8_FONT_GLYPH_BYTES
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
