use crate::opcode::Opcode;
use crate::{Error, Result, FONT_DATA, MEMORY_SIZE, ROM_SIZE, START_FONT, START_ROM};

/// Flat byte-addressable storage of the machine, 4096 bytes.
///
/// Addresses 0x000..=0x1FF are reserved for the interpreter, a ROM occupies
/// 0x200 onward. Every access is bounds-checked; an out-of-range address is
/// a fatal [`Error::AddressOutOfBounds`] rather than a silent wrap.
#[derive(Debug)]
pub struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    pub fn new() -> Self {
        Memory([0; MEMORY_SIZE])
    }

    /// Zero-fills the whole address space, including the font table.
    pub fn reset(&mut self) {
        self.0.fill(0);
    }

    /// Writes the built-in hex digit sprites at 0x050..=0x09F.
    pub fn load_font(&mut self) {
        self.0[START_FONT..START_FONT + FONT_DATA.len()].copy_from_slice(FONT_DATA);
    }

    /// Writes `bytes` starting at 0x200.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > ROM_SIZE {
            return Err(Error::RomTooLarge(bytes.len()));
        }

        self.0[START_ROM..START_ROM + bytes.len()].copy_from_slice(bytes);

        log::info!("loaded rom with {} bytes at 0x{:03X}", bytes.len(), START_ROM);

        Ok(())
    }

    pub fn read_byte(&self, address: usize) -> Result<u8> {
        self.check(address)?;
        Ok(self.0[address])
    }

    pub fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        self.check(address)?;
        self.0[address] = value;
        Ok(())
    }

    /// Reads a big-endian 16-bit instruction word at `address`.
    pub fn read_opcode(&self, address: usize) -> Result<Opcode> {
        self.check(address + 1)?;
        Ok(Opcode::from_bytes(self.0[address], self.0[address + 1]))
    }

    /// Writes a big-endian 16-bit value as two consecutive bytes, high byte
    /// first. Used by tests and tooling to construct programs in place.
    pub fn store_opcode(&mut self, address: usize, opcode: u16) -> Result<()> {
        self.check(address + 1)?;
        self.0[address] = (opcode >> 8) as u8;
        self.0[address + 1] = (opcode & 0x00FF) as u8;
        Ok(())
    }

    /// Borrows `length` bytes starting at `address`, e.g. the rows of a
    /// sprite pointed at by the I register.
    pub fn read_slice(&self, address: usize, length: usize) -> Result<&[u8]> {
        if length == 0 {
            return Ok(&[]);
        }
        self.check(address + length - 1)?;
        Ok(&self.0[address..address + length])
    }

    fn check(&self, address: usize) -> Result<()> {
        if address >= MEMORY_SIZE {
            return Err(Error::AddressOutOfBounds(address));
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
