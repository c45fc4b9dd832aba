use std::fmt;

/// A 16-bit instruction word, fetched big-endian from memory.
///
/// Field extraction follows the usual CHIP-8 naming:
///
/// - `nnn` - the lowest 12 bits, an address
/// - `n` - the lowest 4 bits
/// - `x` - the lower 4 bits of the high byte, a register index
/// - `y` - the upper 4 bits of the low byte, a register index
/// - `kk` - the lowest 8 bits, an immediate value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode((high as u16) << 8 | low as u16)
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn x(self) -> usize {
        (self.0 >> 8 & 0x0F) as usize
    }

    pub fn y(self) -> usize {
        (self.0 >> 4 & 0x0F) as usize
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
}

impl From<u16> for Opcode {
    fn from(value: u16) -> Self {
        Opcode(value)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
